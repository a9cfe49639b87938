use core::time::Duration;

/// How the drain task learns that producers have written something.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Wake {
    /// Writers give a wake signal after releasing the write lock.
    #[default]
    Signal,
    /// The drain task sleeps for the given period between checks, writers never signal.
    Poll(Duration),
}

/// Drain task parameters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Config {
    priority: u32,
    stack_size: usize,
    name: &'static str,
    wake: Wake,
}

impl Config {
    pub const DEFAULT_PRIORITY: u32 = 1;
    pub const DEFAULT_STACK_SIZE: usize = 512;
    pub const DEFAULT_NAME: &'static str = "tsink";

    pub const fn new(priority: u32) -> Self {
        Self {
            priority,
            stack_size: Self::DEFAULT_STACK_SIZE,
            name: Self::DEFAULT_NAME,
            wake: Wake::Signal,
        }
    }

    /// Stack size of the drain task, in units of the platform.
    pub const fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }
    pub const fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
    pub const fn with_wake(mut self, wake: Wake) -> Self {
        self.wake = wake;
        self
    }

    #[inline]
    pub const fn priority(&self) -> u32 {
        self.priority
    }
    #[inline]
    pub const fn stack_size(&self) -> usize {
        self.stack_size
    }
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }
    #[inline]
    pub const fn wake(&self) -> Wake {
        self.wake
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PRIORITY)
    }
}
