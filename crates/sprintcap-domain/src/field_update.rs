/// Three-state update for an optional task field.
///
/// - `NoChange`: leave the field alone
/// - `Set(value)`: store the value
/// - `Clear`: reset the field to `None`
///
/// # Example
///
/// ```
/// use sprintcap_domain::FieldUpdate;
///
/// let mut assignee = Some("Alice".to_string());
/// FieldUpdate::Set("Bob".to_string()).apply_to(&mut assignee);
/// assert_eq!(assignee.as_deref(), Some("Bob"));
///
/// FieldUpdate::<String>::Clear.apply_to(&mut assignee);
/// assert_eq!(assignee, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    NoChange,
    Set(T),
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::NoChange
    }
}

impl<T> FieldUpdate<T> {
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, FieldUpdate::NoChange)
    }

    /// The value the field would hold after this update, or `None` when the
    /// update leaves it untouched.
    pub fn target(&self) -> Option<Option<&T>> {
        match self {
            FieldUpdate::NoChange => None,
            FieldUpdate::Set(value) => Some(Some(value)),
            FieldUpdate::Clear => Some(None),
        }
    }
}

impl<T: PartialEq> FieldUpdate<T> {
    /// Whether applying this update to `current` would change it.
    pub fn changes(&self, current: &Option<T>) -> bool {
        match self.target() {
            None => false,
            Some(target) => target != current.as_ref(),
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}
