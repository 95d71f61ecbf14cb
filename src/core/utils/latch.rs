use std::ops::{Deref, DerefMut};

/// A value that remembers whether it was mutably accessed since the last `reset`.
#[derive(Debug, Clone)]
pub struct Latch<T> {
    value: T,
    latch: bool,
}

impl<T> Deref for Latch<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> DerefMut for Latch<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.latch = true;
        &mut self.value
    }
}

impl<T> Latch<T> {
    pub fn new_set(value: T) -> Self {
        Self { value, latch: true }
    }

    #[cfg(test)]
    pub fn is_set(&self) -> bool {
        self.latch
    }

    pub fn reset(&mut self) -> bool {
        if self.latch {
            self.latch = false;
            return true;
        }
        false
    }
}
