use std::collections::BTreeMap;
use std::fmt;

use sleeplog_logging::{sleeplog_debug, sleeplog_warn};

use crate::ids;

/// Number of day buckets per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PageSize {
    #[default]
    Week,
    Month,
}

impl PageSize {
    pub const ALL: [PageSize; 2] = [PageSize::Week, PageSize::Month];

    pub const fn days(self) -> u32 {
        match self {
            PageSize::Week => 7,
            PageSize::Month => 30,
        }
    }

    pub fn from_days(days: u32) -> Option<Self> {
        match days {
            7 => Some(PageSize::Week),
            30 => Some(PageSize::Month),
            _ => None,
        }
    }

    pub const fn mode(self) -> &'static str {
        match self {
            PageSize::Week => "week",
            PageSize::Month => "month",
        }
    }

    pub const fn control_id(self) -> &'static str {
        match self {
            PageSize::Week => ids::MODE_WEEK,
            PageSize::Month => ids::MODE_MONTH,
        }
    }
}

/// Opaque position token issued by the analytics service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDirection {
    First,
    Before(Cursor),
    After(Cursor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorDirection {
    #[default]
    None,
    Before,
    After,
}

pub type RequestSeq = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page_size: PageSize,
    pub before: Option<Cursor>,
    pub after: Option<Cursor>,
}

impl PageQuery {
    pub fn new(page_size: PageSize, direction: &PageDirection) -> Self {
        let (before, after) = match direction {
            PageDirection::First => (None, None),
            PageDirection::Before(cursor) => (Some(cursor.clone()), None),
            PageDirection::After(cursor) => (None, Some(cursor.clone())),
        };
        Self {
            page_size,
            before,
            after,
        }
    }

    /// Query-string pairs in the order the analytics endpoint expects them.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("page_size", self.page_size.days().to_string())];
        if let Some(before) = &self.before {
            params.push(("before", before.to_string()));
        }
        if let Some(after) = &self.after {
            params.push(("after", after.to_string()));
        }
        params
    }
}

/// Column-oriented chart data as delivered by the service.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesPayload {
    pub dates: Vec<String>,
    pub series: BTreeMap<String, Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageMetric {
    pub avg_sleep_duration: Option<f64>,
    pub sleep_efficiency: Option<f64>,
}

/// One page as returned by the analytics endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageResponse {
    pub series: Option<SeriesPayload>,
    pub has_previous: bool,
    pub prev_cursor: Option<Cursor>,
    pub has_next: bool,
    pub next_cursor: Option<Cursor>,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub metric: Option<PageMetric>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub message: String,
}

impl FetchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayMetrics {
    pub date: String,
    pub values: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<DayMetrics>,
    pub cursor_prev: Option<Cursor>,
    pub cursor_next: Option<Cursor>,
    pub page_size: PageSize,
}

impl Page {
    /// Builds a page from a response. A cursor is kept only when the matching
    /// `has_*` flag is set.
    pub fn from_response(response: &PageResponse, page_size: PageSize) -> Self {
        let items = response
            .series
            .as_ref()
            .map(|payload| {
                payload
                    .dates
                    .iter()
                    .enumerate()
                    .map(|(index, date)| DayMetrics {
                        date: date.clone(),
                        values: payload
                            .series
                            .iter()
                            .map(|(key, column)| (key.clone(), column.get(index).copied().flatten()))
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            items,
            cursor_prev: response
                .prev_cursor
                .clone()
                .filter(|_| response.has_previous),
            cursor_next: response.next_cursor.clone().filter(|_| response.has_next),
            page_size,
        }
    }

    pub fn dates(&self) -> Vec<String> {
        self.items.iter().map(|day| day.date.clone()).collect()
    }

    pub fn column(&self, key: &str) -> Vec<Option<f64>> {
        self.items
            .iter()
            .map(|day| day.values.get(key).copied().flatten())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaginationState {
    pub page_size: PageSize,
    pub active_cursor_direction: CursorDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageApply {
    Applied,
    Stale,
    Failed,
}

/// Owns the page size, the active cursor and the current page. Each request
/// carries a sequence number; only the response to the latest one is applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaginatedSeries {
    state: PaginationState,
    latest_seq: RequestSeq,
    in_flight: Option<RequestSeq>,
    page: Option<Page>,
}

impl PaginatedSeries {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            state: PaginationState {
                page_size,
                active_cursor_direction: CursorDirection::None,
            },
            ..Self::default()
        }
    }

    /// Issues a fetch; supersedes any request still in flight.
    pub fn load_page(&mut self, direction: &PageDirection) -> (RequestSeq, PageQuery) {
        self.latest_seq += 1;
        self.in_flight = Some(self.latest_seq);
        self.state.active_cursor_direction = match direction {
            PageDirection::First => CursorDirection::None,
            PageDirection::Before(_) => CursorDirection::Before,
            PageDirection::After(_) => CursorDirection::After,
        };
        (
            self.latest_seq,
            PageQuery::new(self.state.page_size, direction),
        )
    }

    /// Switches the page-size mode. Returns false when `page_size` is current.
    pub fn set_page_size(&mut self, page_size: PageSize) -> bool {
        if self.state.page_size == page_size {
            return false;
        }
        self.state.page_size = page_size;
        self.state.active_cursor_direction = CursorDirection::None;
        true
    }

    /// Starts over at the first page. The sequence counter keeps running so
    /// responses to requests issued before the reset stay stale.
    pub fn reset(&mut self, page_size: PageSize) {
        self.state = PaginationState {
            page_size,
            active_cursor_direction: CursorDirection::None,
        };
        self.latest_seq += 1;
        self.in_flight = None;
        self.page = None;
    }

    /// Installs a page without a request, as delivered by bootstrap data.
    pub fn install(&mut self, response: &PageResponse) -> &Page {
        self.in_flight = None;
        self.page.insert(Page::from_response(response, self.state.page_size))
    }

    pub fn accept(
        &mut self,
        seq: RequestSeq,
        result: &Result<PageResponse, FetchFailure>,
    ) -> PageApply {
        if seq != self.latest_seq {
            sleeplog_debug!(
                "Dropping stale page response seq={} latest={}",
                seq,
                self.latest_seq
            );
            return PageApply::Stale;
        }
        self.in_flight = None;
        match result {
            Ok(response) => {
                self.page = Some(Page::from_response(response, self.state.page_size));
                PageApply::Applied
            }
            Err(failure) => {
                sleeplog_warn!("Failed to load page seq={}: {}", seq, failure.message);
                PageApply::Failed
            }
        }
    }

    pub fn page_size(&self) -> PageSize {
        self.state.page_size
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn in_flight(&self) -> Option<RequestSeq> {
        self.in_flight
    }
}
