/// Banner severity. Declaration order is the priority order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusKind {
    #[default]
    Info,
    Success,
    Error,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::Info => "info",
            StatusKind::Success => "success",
            StatusKind::Error => "error",
        }
    }

    /// Info is transient progress chatter; the others carry an outcome the user
    /// has not necessarily read yet.
    pub fn is_significant(self) -> bool {
        self > StatusKind::Info
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub kind: StatusKind,
}

impl Status {
    pub fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, message)
    }

    /// Apply an update that did not come from the user's own action, such as an
    /// editor load finishing. A significant status survives any update that does
    /// not outrank it.
    pub fn reconcile(&self, incoming: Status) -> Status {
        if self.kind.is_significant() && self.kind >= incoming.kind {
            self.clone()
        } else {
            incoming
        }
    }
}
