use tracing::trace;

use super::{ComponentCell, ComponentEvent, EffectContext, HandlerError};

/// One component captured in a dispatch snapshot.
#[derive(Clone)]
pub struct DispatchEntry {
    priority: i32,
    seq: u64,
    name: &'static str,
    cell: ComponentCell,
}

impl core::fmt::Debug for DispatchEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DispatchEntry")
            .field("priority", &self.priority)
            .field("seq", &self.seq)
            .field("name", &self.name)
            .finish()
    }
}

impl DispatchEntry {
    pub(crate) fn new(priority: i32, seq: u64, name: &'static str, cell: ComponentCell) -> Self {
        Self {
            priority,
            seq,
            name,
            cell,
        }
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Attach sequence within the owning container.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invokes the component's handler.
    ///
    /// Returns `Ok(false)` without calling it when the component is already
    /// running further up the stack.
    pub fn invoke(
        &self,
        event: &mut ComponentEvent,
        ctx: &mut EffectContext<'_>,
    ) -> Result<bool, HandlerError> {
        let Ok(mut component) = self.cell.try_borrow_mut() else {
            trace!(component = self.name, event = event.name(), "reentrant dispatch skipped");
            return Ok(false);
        };
        component.on_event(event, ctx)?;
        Ok(true)
    }
}

/// Ordered snapshot of the components reached by one dispatch.
#[derive(Clone, Debug, Default)]
pub struct Dispatch {
    entries: Vec<DispatchEntry>,
}

impl Dispatch {
    pub(crate) fn new(entries: Vec<DispatchEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DispatchEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<DispatchEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delivers `event` to every entry in order.
    ///
    /// Delivery stops once the event is cancelled. The first handler error is
    /// returned and the remaining entries are not invoked. Returns the number
    /// of handlers that ran.
    pub fn deliver(
        &self,
        event: &mut ComponentEvent,
        ctx: &mut EffectContext<'_>,
    ) -> Result<usize, HandlerError> {
        let mut delivered = 0;
        for entry in &self.entries {
            if event.is_cancelled() {
                trace!(
                    event = event.name(),
                    reason = event.reason().unwrap_or_default(),
                    "dispatch stopped by cancellation"
                );
                break;
            }
            if entry.invoke(event, ctx)? {
                delivered += 1;
            }
        }
        Ok(delivered)
    }
}
