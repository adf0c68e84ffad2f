/// The 16-slot call stack.
///
/// Overflow and underflow are silently ignored, matching the leniency of
/// historical interpreters: a CALL with a full stack does nothing at all,
/// and a RET with an empty stack does nothing at all.
#[derive(Debug, Clone)]
pub struct Stack {
    slots: [u16; Self::DEPTH],
    sp: u8,
}

impl Stack {
    pub const DEPTH: usize = 16;

    pub fn new() -> Self {
        Self {
            slots: [0; Self::DEPTH],
            sp: 0,
        }
    }

    /// Returns false (and stores nothing) when the stack is already full.
    pub fn push(&mut self, addr: u16) -> bool {
        if (self.sp as usize) < Self::DEPTH {
            self.slots[self.sp as usize] = addr;
            self.sp += 1;
            true
        } else {
            false
        }
    }

    /// Returns None when the stack is empty.
    pub fn pop(&mut self) -> Option<u16> {
        if self.sp > 0 {
            self.sp -= 1;
            Some(self.slots[self.sp as usize])
        } else {
            None
        }
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// The return addresses currently on the stack, bottom first.
    pub fn entries(&self) -> &[u16] {
        &self.slots[..self.sp as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_round_trip() {
        let mut stack = Stack::new();
        assert!(stack.push(0x0202));
        assert!(stack.push(0x0304));
        assert_eq!(stack.sp(), 2);
        assert_eq!(stack.pop(), Some(0x0304));
        assert_eq!(stack.pop(), Some(0x0202));
        assert_eq!(stack.sp(), 0);
    }

    #[test]
    fn overflow_is_rejected() {
        let mut stack = Stack::new();
        for _ in 0..Stack::DEPTH {
            assert!(stack.push(0x0200));
        }
        assert!(!stack.push(0x0200));
        assert_eq!(stack.sp() as usize, Stack::DEPTH);
    }

    #[test]
    fn underflow_returns_none() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.sp(), 0);
    }
}
