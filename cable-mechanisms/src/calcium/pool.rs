use cable_core::{
    Context, ImplicitOde, IonAccess, IonDependency, Mechanism,
    bus::{BusError, CompartmentId, IonBus, ReadHandle, WriteHandle},
    constraint::{ConstraintError, NonZero, StrictlyPositive},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Faraday constant (C/mol).
pub const FARADAY: f64 = 96485.309;

/// Name used in diagnostics and write-ownership records.
const NAME: &str = "ca_pool";

/// Species providing the transmembrane calcium current.
const CURRENT_SPECIES: &str = "ca";

/// Species whose shell concentration this mechanism owns.
const POOL_SPECIES: &str = "cas";

const ION_DEPENDENCIES: &[IonDependency] = &[
    IonDependency {
        species: CURRENT_SPECIES,
        access: IonAccess::ReadCurrent,
        valence: None,
    },
    IonDependency {
        species: POOL_SPECIES,
        access: IonAccess::WriteConcentration,
        valence: Some(2.0),
    },
];

/// Per-instance parameters of the calcium pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalciumPoolConfig {
    /// Decay time constant (ms).
    pub tau_decay: f64,

    /// Equilibrium pool concentration (mM).
    pub c_inf: f64,

    /// Dimensionless coupling between calcium current and pool flux.
    pub f_coupling: f64,
}

impl Default for CalciumPoolConfig {
    fn default() -> Self {
        Self {
            tau_decay: 1000.0,
            c_inf: 5e-5,
            f_coupling: 0.024,
        }
    }
}

/// Model-wide constants shared by every pool instance.
///
/// Loaded once before simulation start and immutable thereafter. Each
/// instance keeps its own copy so the conversion factor it derives stays
/// with the instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalciumGlobals {
    pub pi: f64,

    /// Thickness of the shell calcium diffuses into (µm).
    pub shell_width: f64,

    /// Valence of the pooled species.
    pub valence: f64,

    /// Faraday constant (C/mol).
    pub faraday: f64,
}

impl Default for CalciumGlobals {
    fn default() -> Self {
        Self {
            pi: 3.14159265,
            shell_width: 1.0,
            valence: 2.0,
            faraday: FARADAY,
        }
    }
}

/// Errors that can occur when attaching a pool to a compartment.
#[derive(Debug, Error)]
pub enum AttachError {
    /// A configuration or global parameter failed validation.
    #[error("invalid {parameter}: {source}")]
    Config {
        parameter: &'static str,
        source: ConstraintError,
    },

    /// Species registration or slot ownership failed.
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// A first-order calcium pool with exponential decay toward equilibrium.
///
/// The pool concentration obeys
///
/// ```text
///   d(pool)/dt = -f_coupling · A · ica + (c_inf - pool) / tau_decay
/// ```
///
/// where `A` converts a membrane current density into a concentration flux
/// across the diffusion shell. Because the decay rate does not depend on the
/// pool within a step, the fixed-step update uses the exact closed-form
/// solution and is unconditionally stable.
///
/// One instance is attached per compartment. Attachment registers the two
/// ion species, obtains a read handle for the calcium current, and claims
/// the single write handle for the shell concentration, so the build fails
/// if another mechanism already produces that concentration.
#[derive(Debug)]
pub struct CalciumPool {
    tau_decay: f64,
    c_inf: f64,
    f_coupling: f64,
    globals: CalciumGlobals,
    ca: ReadHandle,
    cas: WriteHandle,

    /// Conversion factor from current density to concentration flux
    /// (mM·cm²/ms/mA), derived once at init.
    flux_scale: f64,

    ica: f64,
    pool: f64,
    rate: f64,
    readout: f64,
    voltage: f64,
}

impl CalciumPool {
    /// Attaches a pool instance to one compartment of `bus`.
    ///
    /// Validates the configuration, registers the `"ca"` and `"cas"`
    /// species, and claims write ownership of the compartment's `"cas"`
    /// concentration slot.
    ///
    /// # Errors
    ///
    /// Returns [`AttachError::Config`] if `tau_decay`, `shell_width`, or
    /// `faraday` is not strictly positive or `valence` is zero, and
    /// [`AttachError::Bus`] if registration or the ownership claim fails.
    pub fn attach(
        config: CalciumPoolConfig,
        globals: CalciumGlobals,
        bus: &mut IonBus,
        compartment: CompartmentId,
    ) -> Result<Self, AttachError> {
        let tau_decay = constrained::<StrictlyPositive>(config.tau_decay, "tau_decay")?;
        constrained::<StrictlyPositive>(globals.shell_width, "shell_width")?;
        constrained::<NonZero>(globals.valence, "valence")?;
        constrained::<StrictlyPositive>(globals.faraday, "faraday")?;

        let ca = bus.register_species(CURRENT_SPECIES, None)?;
        let cas = bus.register_species(POOL_SPECIES, Some(globals.valence))?;
        let ca = bus.read_handle(ca, compartment)?;
        let cas = bus.claim_write(cas, compartment, NAME)?;

        Ok(Self {
            tau_decay,
            c_inf: config.c_inf,
            f_coupling: config.f_coupling,
            globals,
            ca,
            cas,
            flux_scale: 0.0,
            ica: 0.0,
            pool: 0.0,
            rate: 0.0,
            readout: 0.0,
            voltage: 0.0,
        })
    }

    /// The pool concentration (mM).
    pub fn pool(&self) -> f64 {
        self.pool
    }

    /// The auxiliary readout channel; mirrors the pool after every update.
    pub fn readout(&self) -> f64 {
        self.readout
    }

    /// The derived current-to-flux conversion factor, zero before `init`.
    pub fn flux_scale(&self) -> f64 {
        self.flux_scale
    }

    /// The calcium current last pulled from the bus (mA/cm²).
    pub fn ica(&self) -> f64 {
        self.ica
    }

    /// The membrane voltage last pulled from the context (mV).
    ///
    /// Not read by the dynamics; part of the standard per-instance context.
    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    /// Copies the compartment's voltage, current, and concentration into
    /// the instance before any computation.
    fn pull(&mut self, ctx: &Context<'_>) {
        let bus = &*ctx.bus;
        self.voltage = ctx.voltage;
        self.ica = self.ca.current(bus);
        self.pool = self.cas.concentration(bus);
    }

    /// Publishes the pool concentration to the owned bus slot.
    fn push(&self, bus: &mut IonBus) {
        self.cas.set_concentration(bus, self.pool);
    }

    /// Instantaneous rate of change of the pool concentration (mM/ms).
    ///
    /// Single source of truth for both solver paths.
    fn dpool_dt(&self) -> f64 {
        -self.f_coupling * self.flux_scale * self.ica + (self.c_inf - self.pool) / self.tau_decay
    }

    /// Exact exponential update over one step, with `ica` held fixed.
    fn integrate(&mut self, dt: f64) {
        let decay = -1.0 / self.tau_decay;
        self.pool += (1.0 - (dt * decay).exp()) * (self.dpool_dt() / -decay);
    }
}

impl Mechanism for CalciumPool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn ion_dependencies(&self) -> &'static [IonDependency] {
        ION_DEPENDENCIES
    }

    fn state_count(&self) -> usize {
        1
    }

    fn state(&self, index: usize) -> f64 {
        assert_eq!(index, 0, "{NAME} has exactly one state");
        self.pool
    }

    fn init(&mut self, ctx: Context<'_>) {
        self.pull(&ctx);
        self.flux_scale =
            1.0 / (self.globals.valence * self.globals.faraday * self.globals.shell_width) * 1e4;
        self.pool = self.c_inf;
        self.readout = self.pool;
        self.push(ctx.bus);
    }

    fn advance(&mut self, ctx: Context<'_>, dt: f64) {
        self.pull(&ctx);
        self.integrate(dt);
        self.readout = self.pool;
        self.push(ctx.bus);
    }
}

impl ImplicitOde for CalciumPool {
    fn ode_derivative(&mut self, ctx: Context<'_>) {
        self.pull(&ctx);
        self.rate = self.dpool_dt();
        self.readout = self.pool;
    }

    fn ode_jacobian_solve(&mut self, ctx: Context<'_>, dt: f64) {
        self.pull(&ctx);
        self.rate /= 1.0 - dt * (-1.0 / self.tau_decay);
        self.readout = self.pool;
    }

    fn rate(&self, index: usize) -> f64 {
        assert_eq!(index, 0, "{NAME} has exactly one state");
        self.rate
    }

    fn set_state(&mut self, index: usize, value: f64, bus: &mut IonBus) {
        assert_eq!(index, 0, "{NAME} has exactly one state");
        self.pool = value;
        self.readout = self.pool;
        self.cas.set_concentration(bus, value);
    }
}

fn constrained<C>(value: f64, parameter: &'static str) -> Result<f64, AttachError>
where
    C: cable_core::constraint::Constraint<f64>,
{
    cable_core::constraint::Constrained::<f64, C>::new(value)
        .map(cable_core::constraint::Constrained::into_inner)
        .map_err(|source| AttachError::Config { parameter, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn attach_default(bus: &mut IonBus) -> CalciumPool {
        CalciumPool::attach(
            CalciumPoolConfig::default(),
            CalciumGlobals::default(),
            bus,
            CompartmentId::new(0),
        )
        .unwrap()
    }

    fn init_default(bus: &mut IonBus) -> CalciumPool {
        let mut pool = attach_default(bus);
        pool.init(Context { voltage: -65.0, bus });
        pool
    }

    /// Sets the calcium current seen by compartment 0.
    fn inject_current(bus: &mut IonBus, ica: f64) {
        let ca = bus.species(CURRENT_SPECIES).unwrap();
        bus.set_current(ca, CompartmentId::new(0), ica);
    }

    #[test]
    fn attach_declares_and_claims_its_ions() {
        let mut bus = IonBus::new(1);
        let pool = attach_default(&mut bus);

        assert_eq!(pool.name(), "ca_pool");
        assert_eq!(pool.state_count(), 1);

        let deps = pool.ion_dependencies();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].species, "ca");
        assert_eq!(deps[0].access, IonAccess::ReadCurrent);
        assert_eq!(deps[1].species, "cas");
        assert_eq!(deps[1].access, IonAccess::WriteConcentration);
        assert_eq!(deps[1].valence, Some(2.0));

        let cas = bus.species(POOL_SPECIES).unwrap();
        assert_eq!(bus.valence(cas), Some(2.0));
        assert_eq!(
            bus.write_owner(cas, CompartmentId::new(0)),
            Some("ca_pool")
        );

        // A second pool on the same compartment must be rejected.
        let err = CalciumPool::attach(
            CalciumPoolConfig::default(),
            CalciumGlobals::default(),
            &mut bus,
            CompartmentId::new(0),
        )
        .unwrap_err();
        assert!(matches!(err, AttachError::Bus(BusError::WriteConflict { .. })));
    }

    #[test]
    fn attach_rejects_zero_tau_decay() {
        let mut bus = IonBus::new(1);
        let err = CalciumPool::attach(
            CalciumPoolConfig {
                tau_decay: 0.0,
                ..CalciumPoolConfig::default()
            },
            CalciumGlobals::default(),
            &mut bus,
            CompartmentId::new(0),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            AttachError::Config {
                parameter: "tau_decay",
                source: ConstraintError::Zero,
            }
        ));
    }

    #[test]
    fn attach_rejects_degenerate_globals() {
        let mut bus = IonBus::new(1);
        let err = CalciumPool::attach(
            CalciumPoolConfig::default(),
            CalciumGlobals {
                valence: 0.0,
                ..CalciumGlobals::default()
            },
            &mut bus,
            CompartmentId::new(0),
        )
        .unwrap_err();

        assert!(matches!(err, AttachError::Config { parameter: "valence", .. }));
    }

    #[test]
    fn init_installs_equilibrium_and_publishes_it() {
        let mut bus = IonBus::new(1);
        let pool = init_default(&mut bus);

        assert_eq!(pool.pool(), 5e-5);
        assert_eq!(pool.readout(), pool.pool());
        assert_eq!(pool.voltage(), -65.0);
        assert_relative_eq!(pool.flux_scale(), 1.0 / (2.0 * FARADAY) * 1e4);

        let cas = bus.species(POOL_SPECIES).unwrap();
        assert_eq!(bus.concentration(cas, CompartmentId::new(0)), 5e-5);
    }

    #[test]
    fn zero_current_at_equilibrium_is_a_fixed_point() {
        let mut bus = IonBus::new(1);
        let mut pool = init_default(&mut bus);

        for _ in 0..100 {
            pool.advance(Context { voltage: -65.0, bus: &mut bus }, 0.01);
        }

        assert_abs_diff_eq!(pool.pool(), 5e-5, epsilon = 1e-12);
    }

    #[test]
    fn single_step_matches_the_closed_form() {
        let mut bus = IonBus::new(1);
        let mut pool = init_default(&mut bus);
        inject_current(&mut bus, 1e-3);

        let config = CalciumPoolConfig::default();
        let dt = 0.01;
        pool.advance(Context { voltage: -65.0, bus: &mut bus }, dt);
        assert_eq!(pool.ica(), 1e-3);

        // Independent evaluation: blend toward the steady state.
        let a = 1.0 / (2.0 * FARADAY) * 1e4;
        let steady = config.c_inf + config.tau_decay * (-config.f_coupling * a * 1e-3);
        let expected = steady + (config.c_inf - steady) * (-dt / config.tau_decay).exp();

        assert_relative_eq!(pool.pool(), expected, max_relative = 1e-9);
    }

    #[test]
    fn pool_decays_monotonically_toward_equilibrium() {
        let mut bus = IonBus::new(1);
        let mut pool = init_default(&mut bus);
        pool.set_state(0, 1e-3, &mut bus);

        // Step size comparable to tau: the exponential update stays stable
        // and the distance to equilibrium shrinks every step.
        let mut distance = (pool.pool() - 5e-5).abs();
        for _ in 0..40 {
            pool.advance(Context { voltage: -65.0, bus: &mut bus }, 500.0);
            let next = (pool.pool() - 5e-5).abs();
            assert!(next < distance, "distance to equilibrium must shrink");
            distance = next;
        }

        assert_abs_diff_eq!(pool.pool(), 5e-5, epsilon = 1e-11);
    }

    #[test]
    fn derivative_agrees_with_the_difference_quotient() {
        let mut bus = IonBus::new(1);
        let mut pool = init_default(&mut bus);
        inject_current(&mut bus, 1e-3);

        pool.ode_derivative(Context { voltage: -65.0, bus: &mut bus });
        let rate = pool.rate(0);

        let before = pool.pool();
        let dt = 1e-4;
        pool.advance(Context { voltage: -65.0, bus: &mut bus }, dt);

        assert_relative_eq!((pool.pool() - before) / dt, rate, max_relative = 1e-6);
    }

    #[test]
    fn jacobian_solve_divides_the_stored_rate() {
        let mut bus = IonBus::new(1);
        let mut pool = init_default(&mut bus);
        inject_current(&mut bus, 1e-3);

        pool.ode_derivative(Context { voltage: -65.0, bus: &mut bus });
        let explicit = pool.rate(0);

        let dt = 0.25;
        pool.ode_jacobian_solve(Context { voltage: -65.0, bus: &mut bus }, dt);

        let tau = CalciumPoolConfig::default().tau_decay;
        assert_relative_eq!(
            pool.rate(0),
            explicit / (1.0 - dt * (-1.0 / tau)),
            max_relative = 1e-15
        );
    }

    #[test]
    fn readout_mirrors_pool_after_every_update() {
        let mut bus = IonBus::new(1);
        let mut pool = init_default(&mut bus);
        inject_current(&mut bus, 2e-3);
        assert_eq!(pool.readout(), pool.pool());

        pool.advance(Context { voltage: -65.0, bus: &mut bus }, 0.025);
        assert_eq!(pool.readout(), pool.pool());

        pool.ode_derivative(Context { voltage: -65.0, bus: &mut bus });
        assert_eq!(pool.readout(), pool.pool());

        pool.ode_jacobian_solve(Context { voltage: -65.0, bus: &mut bus }, 0.025);
        assert_eq!(pool.readout(), pool.pool());
    }

    #[test]
    fn set_state_writes_through_to_the_bus() {
        let mut bus = IonBus::new(1);
        let mut pool = init_default(&mut bus);

        pool.set_state(0, 7e-4, &mut bus);

        assert_eq!(pool.pool(), 7e-4);
        assert_eq!(pool.readout(), 7e-4);
        let cas = bus.species(POOL_SPECIES).unwrap();
        assert_eq!(bus.concentration(cas, CompartmentId::new(0)), 7e-4);
    }
}
