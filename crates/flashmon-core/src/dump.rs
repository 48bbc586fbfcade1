//! Paged dump scheduling
//!
//! Reading and printing a whole device in one stretch would block input
//! handling for the duration; the cursor slices the dump into one page per
//! scheduler tick so the console stays responsive while a dump streams.

/// Resumable page-granular cursor over the device address space.
///
/// Idle is `page_index == pages_total`, including the initial 0/0. The
/// counters are cleared by the first step that finds the dump complete -
/// one tick after the last page went out, never merged into it. Downstream
/// interleaving with incoming commands depends on that extra idle tick.
#[derive(Debug, Default)]
pub struct DumpCursor {
    pages_total: u32,
    page_index: u32,
    page_size: u32,
}

impl DumpCursor {
    /// Create an idle cursor.
    pub const fn new() -> Self {
        Self {
            pages_total: 0,
            page_index: 0,
            page_size: 0,
        }
    }

    /// Begin a dump over `capacity` bytes in `page_size` chunks.
    ///
    /// The page count is `capacity / page_size`; trailing bytes that do
    /// not fill a whole page are never dumped. Starting while a dump is
    /// active restarts it from page zero. A zero page size leaves the
    /// cursor idle.
    pub fn start(&mut self, capacity: u32, page_size: u32) {
        if page_size == 0 {
            self.pages_total = 0;
            self.page_index = 0;
            return;
        }
        self.pages_total = capacity / page_size;
        self.page_index = 0;
        self.page_size = page_size;
        log::debug!(
            "dump started: {} pages of {} bytes",
            self.pages_total,
            self.page_size
        );
    }

    /// True while pages remain to be emitted.
    pub fn is_active(&self) -> bool {
        self.page_index < self.pages_total
    }

    /// One scheduler step: the byte address of the page to emit, or `None`.
    ///
    /// Does not advance; the caller reports completion with
    /// [`DumpCursor::advance`] once the page was actually read and written,
    /// so a failed read retries the same page on the next tick. A step on a
    /// finished dump only clears the counters and touches no state besides.
    pub fn step(&mut self) -> Option<u32> {
        if self.page_index == self.pages_total {
            self.pages_total = 0;
            self.page_index = 0;
            None
        } else {
            Some(self.page_index * self.page_size)
        }
    }

    /// Record that the page returned by the last [`DumpCursor::step`] was
    /// emitted.
    pub fn advance(&mut self) {
        debug_assert!(self.is_active());
        self.page_index += 1;
    }

    /// Page size captured by [`DumpCursor::start`].
    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}
