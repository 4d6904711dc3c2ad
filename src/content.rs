//! Daily ritual content: a quote and a narration piece for each weekday,
//! one pair for the morning rise and one for the evening rest.

use chrono::{Datelike, Local, Weekday};

#[derive(Debug, Clone, Copy)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

/// A narratable piece: the title shown to the user and the prompt sent to
/// the narration service. `duration` is the expected listen length.
#[derive(Debug, Clone, Copy)]
pub struct AudioPiece {
    pub title: &'static str,
    pub prompt: &'static str,
    pub duration: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct DayContent {
    pub rise_quote: Quote,
    pub rest_quote: Quote,
    pub rise_audio: AudioPiece,
    pub rest_audio: AudioPiece,
}

/// Indexed Sunday = 0 through Saturday = 6.
pub static DAILY_CONTENT: [DayContent; 7] = [
    // Sunday
    DayContent {
        rise_quote: Quote {
            text: "A Sunday well spent brings a week of content.",
            author: "Proverb",
        },
        rest_quote: Quote {
            text: "The soul feels refreshed when it is near tranquil waters.",
            author: "Unknown",
        },
        rise_audio: AudioPiece {
            title: "Sunday Renewal",
            prompt: "Sunday Renewal. Breathe in the stillness of this morning. Today is a blank page, a soft reset for your soul. Visualize a gentle white light clearing away any lingering stress from the past. You are fresh, you are open, and you are ready to simply be.",
            duration: "2:15",
        },
        rest_audio: AudioPiece {
            title: "Weekly Release",
            prompt: "Weekly Release. As Sunday closes, prepare your spirit for the week ahead not with worry, but with trust. Visualize the coming week as a landscape you will walk through with grace. Release the need to control every outcome. Trust your ability to handle what comes. Rest now in that trust.",
            duration: "3:10",
        },
    },
    // Monday
    DayContent {
        rise_quote: Quote {
            text: "This is your Monday morning reminder that you can handle whatever this week throws at you.",
            author: "Unknown",
        },
        rest_quote: Quote {
            text: "Let go of the day's battles. Peace is your natural state.",
            author: "Lao Tzu",
        },
        rise_audio: AudioPiece {
            title: "Monday Momentum",
            prompt: "Monday Momentum. Feel the fresh energy of a new week. Like the sun rising, you have the power to illuminate your path today. Set a clear intention to move with purpose. You are capable, you are prepared, and you are supported. Breathe in energy, breathe out doubt.",
            duration: "2:05",
        },
        rest_audio: AudioPiece {
            title: "Unwinding the Mind",
            prompt: "Unwinding the Mind. You have navigated the first day of the week. Now, release the activity. Let your shoulders drop. Imagine unspooling a tight thread, letting it go slack and soft. The day is done. You have done enough. Return to your center.",
            duration: "3:30",
        },
    },
    // Tuesday
    DayContent {
        rise_quote: Quote {
            text: "The secret of getting ahead is getting started.",
            author: "Mark Twain",
        },
        rest_quote: Quote {
            text: "The best bridge between despair and hope is a good night's sleep.",
            author: "E. Joseph Cossman",
        },
        rise_audio: AudioPiece {
            title: "Steady Flow",
            prompt: "Steady Flow. Connect with the rhythm of your breath. Consistency is your superpower today. You do not need to sprint; you only need to take the next step. Feel the ground solid beneath you. You are steady, grounded, and moving forward with grace.",
            duration: "2:10",
        },
        rest_audio: AudioPiece {
            title: "Grounding Peace",
            prompt: "Grounding Peace. Feel the earth beneath you, supporting you. Tuesday is done. Find a sense of stability in your body. Whatever happened today, let it settle like dust returning to the earth. You are safe. You are held. Drift into a heavy, peaceful sleep.",
            duration: "3:15",
        },
    },
    // Wednesday
    DayContent {
        rise_quote: Quote {
            text: "Believe you can and you're halfway there.",
            author: "Theodore Roosevelt",
        },
        rest_quote: Quote {
            text: "Each night, when I go to sleep, I die. And the next morning, when I wake up, I am reborn.",
            author: "Mahatma Gandhi",
        },
        rise_audio: AudioPiece {
            title: "Midweek Balance",
            prompt: "Midweek Balance. You are in the center of the week. Find your equilibrium. Imagine a scale coming to a perfect rest. Breathing in balance, breathing out chaotic energy. Realign with your purpose. You are exactly where you need to be.",
            duration: "2:20",
        },
        rest_audio: AudioPiece {
            title: "Gentle Reflection",
            prompt: "Gentle Reflection. Pause and look back at the days passed so far. Acknowledge your efforts without judgment. Be kind to yourself for what remains unfinished. You are a work in progress, and that is beautiful. Offer yourself compassion tonight.",
            duration: "3:25",
        },
    },
    // Thursday
    DayContent {
        rise_quote: Quote {
            text: "It does not matter how slowly you go as long as you do not stop.",
            author: "Confucius",
        },
        rest_quote: Quote {
            text: "Rest is not idleness, and to lie sometimes on the grass under trees on a summer's day is by no means a waste of time.",
            author: "John Lubbock",
        },
        rise_audio: AudioPiece {
            title: "Resilient Spirit",
            prompt: "Resilient Spirit. Call upon your inner strength this morning. You are capable and resilient. Whatever challenges arise, know that you have the tools within you to meet them. Breathe in confidence. Breathe out fear. Stand tall in your power.",
            duration: "2:15",
        },
        rest_audio: AudioPiece {
            title: "Softening Down",
            prompt: "Softening Down. The week is maturing. It is safe to soften now. Release any armor you have worn to get through the days. Let your face relax, let your jaw loosen. Invite a softness into your heart. Rest is the fuel for your resilience.",
            duration: "3:20",
        },
    },
    // Friday
    DayContent {
        rise_quote: Quote {
            text: "Make each day your masterpiece.",
            author: "John Wooden",
        },
        rest_quote: Quote {
            text: "Finish each day and be done with it. You have done what you could.",
            author: "Ralph Waldo Emerson",
        },
        rise_audio: AudioPiece {
            title: "Friday Vibrance",
            prompt: "Friday Vibrance. Welcome the joy of today. Let anticipation lift your spirit. Feel a lightness in your step. Today is a day to finish strong and open your heart to the weekend's possibilities. Shine your light brightly.",
            duration: "2:00",
        },
        rest_audio: AudioPiece {
            title: "Gratitude & Celebration",
            prompt: "Gratitude and Celebration. The work week is behind you. Celebrate your journey. Give thanks for your energy, your effort, and your endurance. You made it. Now, the time for rest and play begins. Let a smile touch your lips as you drift off.",
            duration: "3:40",
        },
    },
    // Saturday
    DayContent {
        rise_quote: Quote {
            text: "The key to a productive weekend is a positive mindset.",
            author: "Unknown",
        },
        rest_quote: Quote {
            text: "Even a soul submerged in sleep is hard at work and helps make something of the world.",
            author: "Heraclitus",
        },
        rise_audio: AudioPiece {
            title: "Weekend Presence",
            prompt: "Weekend Presence. Wake up to the freedom of today. Be fully present in this moment. Not doing, just being. Notice the sunlight, the sounds, the feeling of waking up without a deadline. Embrace the luxury of time. Today is yours.",
            duration: "2:25",
        },
        rest_audio: AudioPiece {
            title: "Deep Restoration",
            prompt: "Deep Restoration. Sink into deep, restorative rest. Let your body recharge completely, like a battery refilling its energy. There is nowhere to go, nothing to do. Your only task is to rest. Surrender to the quiet. Sleep deep.",
            duration: "3:45",
        },
    },
];

pub fn for_weekday(weekday: Weekday) -> &'static DayContent {
    &DAILY_CONTENT[weekday.num_days_from_sunday() as usize]
}

pub fn today() -> &'static DayContent {
    for_weekday(Local::now().weekday())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_day_has_complete_content() {
        for day in &DAILY_CONTENT {
            assert!(!day.rise_quote.text.is_empty());
            assert!(!day.rest_quote.text.is_empty());
            assert!(!day.rise_audio.title.is_empty());
            assert!(!day.rise_audio.prompt.is_empty());
            assert!(!day.rest_audio.prompt.is_empty());
        }
    }

    #[test]
    fn week_starts_on_sunday() {
        assert_eq!(for_weekday(Weekday::Sun).rise_audio.title, "Sunday Renewal");
        assert_eq!(for_weekday(Weekday::Mon).rise_audio.title, "Monday Momentum");
        assert_eq!(for_weekday(Weekday::Sat).rest_audio.title, "Deep Restoration");
    }
}
