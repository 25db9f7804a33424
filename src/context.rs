use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation shared by every algorithm entry point.
///
/// A context is created by the caller and borrowed for the duration of a computation.
/// Algorithms poll [`Context::is_terminated`] at well defined points (once per elimination
/// step, once per processed tree node, once per decomposition of the iterative driver) and
/// stop without exposing partially built results once the flag is set.
#[derive(Debug, Default)]
pub struct Context {
    terminated: AtomicBool,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.terminated.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn terminate_and_reset() {
        let context = Context::new();
        assert!(!context.is_terminated());
        context.terminate();
        assert!(context.is_terminated());
        context.reset();
        assert!(!context.is_terminated());
    }

    #[test]
    fn terminate_from_other_thread() {
        let context = Arc::new(Context::new());
        let shared = Arc::clone(&context);
        thread::spawn(move || shared.terminate()).join().unwrap();
        assert!(context.is_terminated());
    }
}
