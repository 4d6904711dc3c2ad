//! Session goal board: up to five focus points, in memory for this ritual only.

pub const MAX_GOALS: usize = 5;

#[derive(Debug, Clone)]
pub struct Goal {
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Default)]
pub struct GoalBoard {
    goals: Vec<Goal>,
}

impl GoalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a goal. Blank input and a full board are rejected.
    pub fn add(&mut self, text: &str) -> Result<(), String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("a goal needs some words".to_string());
        }
        if self.goals.len() >= MAX_GOALS {
            return Err(format!("keep it focused: {MAX_GOALS} goals at most"));
        }
        self.goals.push(Goal {
            text: text.to_string(),
            completed: false,
        });
        Ok(())
    }

    /// Remove the goal at `index` (0-based). Out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<Goal> {
        if index < self.goals.len() {
            Some(self.goals.remove(index))
        } else {
            None
        }
    }

    /// Mark the goal at `index` done.
    pub fn complete(&mut self, index: usize) -> Option<&Goal> {
        let goal = self.goals.get_mut(index)?;
        goal.completed = true;
        Some(goal)
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.goals.iter().filter(|g| g.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_trimmed_goals() {
        let mut board = GoalBoard::new();
        board.add("  write the report  ").unwrap();
        assert_eq!(board.goals()[0].text, "write the report");
        assert!(!board.goals()[0].completed);
    }

    #[test]
    fn rejects_blank_goals() {
        let mut board = GoalBoard::new();
        assert!(board.add("   ").is_err());
        assert!(board.is_empty());
    }

    #[test]
    fn caps_at_five() {
        let mut board = GoalBoard::new();
        for i in 0..MAX_GOALS {
            board.add(&format!("goal {i}")).unwrap();
        }
        assert!(board.add("one too many").is_err());
        assert_eq!(board.len(), MAX_GOALS);
    }

    #[test]
    fn remove_frees_a_slot() {
        let mut board = GoalBoard::new();
        for i in 0..MAX_GOALS {
            board.add(&format!("goal {i}")).unwrap();
        }
        let removed = board.remove(2).unwrap();
        assert_eq!(removed.text, "goal 2");
        assert!(board.add("replacement").is_ok());
    }

    #[test]
    fn out_of_range_operations_are_noops() {
        let mut board = GoalBoard::new();
        board.add("only one").unwrap();
        assert!(board.remove(5).is_none());
        assert!(board.complete(5).is_none());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn complete_marks_and_counts() {
        let mut board = GoalBoard::new();
        board.add("first").unwrap();
        board.add("second").unwrap();
        board.complete(1).unwrap();
        assert_eq!(board.completed_count(), 1);
        assert!(board.goals()[1].completed);
    }
}
