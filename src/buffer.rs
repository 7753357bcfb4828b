/// Two instances of a field: the settled `current` one that stages read, and
/// the `next` one a single stage writes. `swap` commits a finished stage.
#[derive(Clone, Debug, PartialEq)]
pub struct PingPong<T> {
    current: T,
    next: T,
}

impl<T: Clone> PingPong<T> {
    pub fn new(initial: T) -> Self {
        let next = initial.clone();
        Self {
            current: initial,
            next,
        }
    }
}

impl<T> PingPong<T> {
    pub fn from_pair(current: T, next: T) -> Self {
        Self { current, next }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    /// Mutable access to the settled buffer, for host-side edits between ticks.
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.current
    }

    /// Read view of `current` alongside exclusive write access to `next`.
    pub fn split(&mut self) -> (&T, &mut T) {
        (&self.current, &mut self.next)
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    pub(crate) fn both(&self) -> [&T; 2] {
        [&self.current, &self.next]
    }
}
