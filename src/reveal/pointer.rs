use std::{
    cell::Cell,
    rc::Rc,
    sync::atomic::{AtomicBool, Ordering},
};

/// Sink for the "hide the custom pointer while media plays" side effect.
///
/// This is a shared side channel, not per-instance state: any controller may set or clear it
/// and the last write wins. Pages are expected to host a single hero media region, so in
/// practice there is one writer.
pub trait PointerAffordance {
    fn set_pointer_hidden(&mut self, hidden: bool);
}

static POINTER_HIDDEN: AtomicBool = AtomicBool::new(false);

/// Process-wide toggle backed by a static flag.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalPointer;

impl GlobalPointer {
    pub fn is_hidden() -> bool {
        POINTER_HIDDEN.load(Ordering::Relaxed)
    }
}

impl PointerAffordance for GlobalPointer {
    fn set_pointer_hidden(&mut self, hidden: bool) {
        POINTER_HIDDEN.store(hidden, Ordering::Relaxed);
    }
}

/// For hosts without a custom pointer.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPointer;

impl PointerAffordance for NoPointer {
    fn set_pointer_hidden(&mut self, _hidden: bool) {}
}

/// Shared cell, handy when the host renders the pointer itself.
impl PointerAffordance for Rc<Cell<bool>> {
    fn set_pointer_hidden(&mut self, hidden: bool) {
        self.set(hidden);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/pointer.rs"]
mod tests;
