//! Reversible commands and the linear undo/redo history
//!
//! Every mutation of map content runs as a [`ReversibleCommand`] through a
//! [`CommandManager`]. Commands are grouped into actions; one undo or redo
//! step always covers a whole action. A command may own resources for both
//! the state it replaced and the state it introduced. Those are released
//! through [`ReversibleCommand::dispose_undo`] when the command can no longer
//! be undone, or [`ReversibleCommand::dispose_redo`] when it can no longer be
//! redone. Each command receives at most one of the two calls.

/// A mutation of `S` paired with its exact inverse
pub trait ReversibleCommand<S> {
    /// Apply the forward mutation
    fn execute(&mut self, state: &mut S);

    /// Restore the state from before `execute`
    fn undo(&mut self, state: &mut S);

    /// Release what an undo would have restored (the command is applied)
    fn dispose_undo(&mut self, _state: &mut S) {}

    /// Release what a redo would have restored (the command is undone)
    fn dispose_redo(&mut self, _state: &mut S) {}

    /// Short description for logging
    fn description(&self) -> &str;
}

type Action<S> = Vec<Box<dyn ReversibleCommand<S>>>;

/// Linear history of command groups with a cursor
pub struct CommandManager<S> {
    actions: Vec<Action<S>>,
    /// Number of actions currently applied
    position: usize,
    /// The last applied action still accepts commands
    action_open: bool,
    max_actions: Option<usize>,
}

impl<S> Default for CommandManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> CommandManager<S> {
    /// Unbounded history
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            position: 0,
            action_open: false,
            max_actions: None,
        }
    }

    /// History that keeps at most `max_actions` undoable actions. Redo
    /// entries do not count towards the cap.
    pub fn with_limit(max_actions: usize) -> Self {
        Self {
            max_actions: Some(max_actions.max(1)),
            ..Self::new()
        }
    }

    pub fn max_actions(&self) -> Option<usize> {
        self.max_actions
    }

    /// Change the cap, evicting the oldest actions if the history is now over it
    pub fn set_max_actions(&mut self, max_actions: Option<usize>, state: &mut S) {
        self.max_actions = max_actions.map(|max| max.max(1));
        self.evict_overflow(state);
    }

    /// Append `command` to the action being built (starting one if needed)
    /// and execute it. Any redo tail is discarded first.
    pub fn add_to_action_and_execute(&mut self, mut command: Box<dyn ReversibleCommand<S>>, state: &mut S) {
        self.discard_redo_tail(state);

        if !self.action_open {
            self.actions.push(Vec::new());
            self.position += 1;
            self.action_open = true;
            self.evict_overflow(state);
        }

        command.execute(state);
        if let Some(action) = self.actions.last_mut() {
            action.push(command);
        }
    }

    /// Close the action being built; the next command starts a new one
    pub fn finish_action(&mut self) {
        self.action_open = false;
    }

    /// Whether commands are still being added to the latest action
    pub fn is_action_open(&self) -> bool {
        self.action_open
    }

    /// Step back one action. Returns false when there is nothing to undo.
    pub fn undo(&mut self, state: &mut S) -> bool {
        self.finish_action();
        if self.position == 0 {
            return false;
        }

        self.position -= 1;
        let action = &mut self.actions[self.position];
        tracing::debug!(commands = action.len(), "Undo action {}", self.position);
        for command in action.iter_mut().rev() {
            command.undo(state);
        }
        true
    }

    /// Step forward one action. Returns false when there is nothing to redo.
    pub fn redo(&mut self, state: &mut S) -> bool {
        self.finish_action();
        if self.position == self.actions.len() {
            return false;
        }

        let action = &mut self.actions[self.position];
        tracing::debug!(commands = action.len(), "Redo action {}", self.position);
        for command in action.iter_mut() {
            command.execute(state);
        }
        self.position += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position < self.actions.len()
    }

    /// Number of actions that can be undone
    pub fn undo_len(&self) -> usize {
        self.position
    }

    /// Number of actions that can be redone
    pub fn redo_len(&self) -> usize {
        self.actions.len() - self.position
    }

    /// Drop the whole history, releasing every retained branch
    pub fn clear(&mut self, state: &mut S) {
        self.discard_redo_tail(state);
        for mut action in self.actions.drain(..) {
            for command in action.iter_mut().rev() {
                command.dispose_undo(state);
            }
        }
        self.position = 0;
        self.action_open = false;
    }

    fn discard_redo_tail(&mut self, state: &mut S) {
        if self.position == self.actions.len() {
            return;
        }
        tracing::debug!(
            actions = self.actions.len() - self.position,
            "Discarding redo history"
        );
        for mut action in self.actions.drain(self.position..) {
            for command in action.iter_mut() {
                command.dispose_redo(state);
            }
        }
        self.action_open = false;
    }

    fn evict_overflow(&mut self, state: &mut S) {
        let Some(max_actions) = self.max_actions else {
            return;
        };
        while self.position > max_actions {
            let mut oldest = self.actions.remove(0);
            for command in oldest.iter_mut().rev() {
                command.dispose_undo(state);
            }
            self.position -= 1;
        }
    }
}
