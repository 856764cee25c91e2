use cable_core::{Context, ImplicitOde, IonBus, IonDependency, Mechanism};

/// A single-state test mechanism: `dy/dt = -y / tau`, advanced exactly.
///
/// Ignores the ion bus entirely; the drivers under test only need the
/// stepping contract.
#[derive(Debug)]
pub(crate) struct DecayCell {
    pub tau: f64,
    pub y: f64,
    pub rate: f64,
}

impl DecayCell {
    pub fn new(tau: f64, y: f64) -> Self {
        Self { tau, y, rate: 0.0 }
    }
}

impl Mechanism for DecayCell {
    fn name(&self) -> &'static str {
        "decay_cell"
    }

    fn ion_dependencies(&self) -> &'static [IonDependency] {
        &[]
    }

    fn state_count(&self) -> usize {
        1
    }

    fn state(&self, index: usize) -> f64 {
        assert_eq!(index, 0);
        self.y
    }

    fn init(&mut self, _ctx: Context<'_>) {}

    fn advance(&mut self, _ctx: Context<'_>, dt: f64) {
        self.y *= (-dt / self.tau).exp();
    }
}

impl ImplicitOde for DecayCell {
    fn ode_derivative(&mut self, _ctx: Context<'_>) {
        self.rate = -self.y / self.tau;
    }

    fn ode_jacobian_solve(&mut self, _ctx: Context<'_>, dt: f64) {
        self.rate /= 1.0 - dt * (-1.0 / self.tau);
    }

    fn rate(&self, index: usize) -> f64 {
        assert_eq!(index, 0);
        self.rate
    }

    fn set_state(&mut self, index: usize, value: f64, _bus: &mut IonBus) {
        assert_eq!(index, 0);
        self.y = value;
    }
}
