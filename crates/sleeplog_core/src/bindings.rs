use crate::ids;
use crate::pagination::{Cursor, PageDirection, PageSize};

/// Clickable controls of the pagination area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlId {
    Prev,
    Next,
    Mode(PageSize),
}

impl ControlId {
    pub fn element_id(self) -> &'static str {
        match self {
            ControlId::Prev => ids::PREV_BUTTON,
            ControlId::Next => ids::NEXT_BUTTON,
            ControlId::Mode(size) => size.control_id(),
        }
    }
}

/// What a bound control does when clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// Load a page; `minted_under` is the page size the cursor belongs to.
    Load {
        direction: PageDirection,
        minted_under: PageSize,
    },
    SelectMode(PageSize),
}

/// Prev/next affordances currently rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaginationControls {
    pub prev: Option<Cursor>,
    pub next: Option<Cursor>,
}

pub type SubscriptionId = u64;

/// Handle for one set of bound handlers, returned by [`NavigationBindings::bind`].
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct Subscription {
    id: SubscriptionId,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Handler {
    subscription: SubscriptionId,
    control: ControlId,
    action: NavAction,
}

/// Click handlers for the pagination area. Handlers only live as long as the
/// subscription that installed them; `rebind` disposes the active one first.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct NavigationBindings {
    handlers: Vec<Handler>,
    next_id: SubscriptionId,
    active: Option<Subscription>,
}

impl Clone for NavigationBindings {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
            next_id: self.next_id,
            active: self.active.as_ref().map(|sub| Subscription { id: sub.id }),
        }
    }
}

impl NavigationBindings {
    /// Installs handlers for the given controls and every mode button.
    pub fn bind(&mut self, controls: &PaginationControls, page_size: PageSize) -> Subscription {
        self.next_id += 1;
        let subscription = self.next_id;

        if let Some(cursor) = &controls.prev {
            self.handlers.push(Handler {
                subscription,
                control: ControlId::Prev,
                action: NavAction::Load {
                    direction: PageDirection::Before(cursor.clone()),
                    minted_under: page_size,
                },
            });
        }
        if let Some(cursor) = &controls.next {
            self.handlers.push(Handler {
                subscription,
                control: ControlId::Next,
                action: NavAction::Load {
                    direction: PageDirection::After(cursor.clone()),
                    minted_under: page_size,
                },
            });
        }
        for mode in PageSize::ALL {
            self.handlers.push(Handler {
                subscription,
                control: ControlId::Mode(mode),
                action: NavAction::SelectMode(mode),
            });
        }

        Subscription { id: subscription }
    }

    pub fn dispose(&mut self, subscription: Subscription) {
        self.handlers
            .retain(|handler| handler.subscription != subscription.id);
    }

    /// Disposes the active subscription and installs a fresh one.
    pub fn rebind(&mut self, controls: &PaginationControls, page_size: PageSize) {
        if let Some(old) = self.active.take() {
            self.dispose(old);
        }
        let subscription = self.bind(controls, page_size);
        self.active = Some(subscription);
    }

    /// Disposes the active subscription without installing a new one.
    pub fn clear(&mut self) {
        if let Some(old) = self.active.take() {
            self.dispose(old);
        }
    }

    /// Every action bound to `control`, oldest subscription first.
    pub fn dispatch(&self, control: ControlId) -> Vec<NavAction> {
        self.handlers
            .iter()
            .filter(|handler| handler.control == control)
            .map(|handler| handler.action.clone())
            .collect()
    }

    pub fn handler_count(&self, control: ControlId) -> usize {
        self.handlers
            .iter()
            .filter(|handler| handler.control == control)
            .count()
    }

    pub fn active(&self) -> Option<SubscriptionId> {
        self.active.as_ref().map(Subscription::id)
    }
}
