//! Like cap enforcement and the finalize trigger

/// Maximum number of concurrently liked menus
pub const DEFAULT_LIKE_CAP: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityGate {
    cap: u32,
}

impl CapacityGate {
    pub fn new(cap: u32) -> Self {
        Self { cap }
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn can_like(&self, current_count: u32) -> bool {
        current_count < self.cap
    }
}

impl Default for CapacityGate {
    fn default() -> Self {
        Self::new(DEFAULT_LIKE_CAP)
    }
}

/// Edge-triggered: fires once when the count reaches the cap and re-arms
/// only after the count drops below it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTrigger {
    cap: u32,
    fired: bool,
}

impl NavigationTrigger {
    pub fn new(cap: u32) -> Self {
        Self { cap, fired: false }
    }

    /// Feed the latest authoritative count. `true` means navigate now.
    pub fn observe(&mut self, count: u32) -> bool {
        if count < self.cap {
            self.fired = false;
            return false;
        }
        if count == self.cap && !self.fired {
            self.fired = true;
            return true;
        }
        false
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}
