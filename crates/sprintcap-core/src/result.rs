use crate::error::PlannerError;

pub type PlannerResult<T> = Result<T, PlannerError>;
