/// Control actions supported by the implicit driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the driver early and return the solution so far.
    StopEarly,
}
