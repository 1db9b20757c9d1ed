use bitflags::bitflags;
use clap::ValueEnum;

use crate::{memory::Memory, stack::Stack};

/// What happens to the popped word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PopMode {
    /// The popped value lands in the register, like `pop rax`
    #[default]
    Register,
    /// The popped value is thrown away and the register is left alone
    Discard,
}

/// Every input the visualizer reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Push,
    Pop,
    Clear,
    /// Enter pressed inside the register field. Behaves exactly like [`Command::Push`].
    Submit,
    Type(char),
    Backspace,
}

bitflags! {
    /// Positional labels attached to a stack slot
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Markers: u8 {
        /// Bottom of the stack, index 0
        const BASE = 1 << 0;
        /// Most recently pushed entry
        const TOP = 1 << 1;
        /// Base pointer register points here
        const RBP = 1 << 2;
        /// Stack pointer register points here
        const RSP = 1 << 3;
    }
}

/// The whole state of the widget.
///
/// Transitions only happen through [`reduce`]. Everything else on this type is derived from the
/// current stack length and recomputed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackVisualizer {
    stack: Stack,
    /// The pending input, named after the CPU register that feeds `push`
    register: String,
    memory: Memory,
    pop_mode: PopMode,
}

impl StackVisualizer {
    pub fn new(memory: Memory, pop_mode: PopMode) -> Self {
        Self {
            stack: Stack::new(),
            register: String::new(),
            memory,
            pop_mode,
        }
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn register(&self) -> &str {
        &self.register
    }

    pub fn memory(&self) -> Memory {
        self.memory
    }

    pub fn pop_mode(&self) -> PopMode {
        self.pop_mode
    }

    pub fn can_push(&self) -> bool {
        !self.register.trim().is_empty()
    }

    pub fn can_pop(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn can_clear(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn address(&self, index: usize) -> u64 {
        self.memory.address(index)
    }

    /// RSP: the top slot, or the base address while nothing is pushed
    pub fn stack_pointer(&self) -> u64 {
        match self.stack.len() {
            0 => self.memory.base(),
            len => self.address(len - 1),
        }
    }

    /// RBP: the bottom slot, unset while nothing is pushed
    pub fn base_pointer(&self) -> Option<u64> {
        (!self.stack.is_empty()).then(|| self.address(0))
    }

    pub fn byte_size(&self) -> u64 {
        Memory::byte_size(self.stack.len())
    }

    /// Labels for the slot at `index`. Slots outside the stack carry none.
    pub fn markers(&self, index: usize) -> Markers {
        let len = self.stack.len();
        let mut markers = Markers::empty();
        if index >= len {
            return markers;
        }

        if index == 0 {
            markers |= Markers::BASE | Markers::RBP;
        }
        if index == len - 1 {
            markers |= Markers::TOP | Markers::RSP;
        }

        markers
    }
}

impl Default for StackVisualizer {
    fn default() -> Self {
        Self::new(Memory::default(), PopMode::default())
    }
}

/// Applies `command` to `state` and returns the resulting state.
///
/// Commands whose precondition does not hold leave the state untouched.
pub fn reduce(mut state: StackVisualizer, command: Command) -> StackVisualizer {
    match command {
        Command::Push | Command::Submit => {
            let value = state.register.trim();
            if value.is_empty() {
                log::debug!("Ignoring push of a blank register");
                return state;
            }

            let value = value.to_owned();
            log::debug!("Pushing {:?} at {:#x}", value, state.address(state.stack.len()));
            state.stack.push(value);
            state.register.clear();
        }
        Command::Pop => {
            let Some(entry) = state.stack.pop() else {
                log::debug!("Ignoring pop of an empty stack");
                return state;
            };

            log::debug!("Popped entry {} ({:?})", entry.id, entry.value);
            if state.pop_mode == PopMode::Register {
                state.register = entry.value;
            }
        }
        Command::Clear => {
            if state.stack.is_empty() {
                log::debug!("Ignoring clear of an empty stack");
                return state;
            }

            log::debug!("Clearing {} entries", state.stack.len());
            state.stack.clear();
            state.register.clear();
        }
        Command::Type(c) => {
            if !c.is_control() {
                state.register.push(c);
            }
        }
        Command::Backspace => {
            state.register.pop();
        }
    }

    state
}
