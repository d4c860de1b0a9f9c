/// Pipeline module wires the suite together as mpsc stages. The dispatching
/// stage turns planned runs into runnable units or skip records; the running
/// stage executes units under the supervisor and emits one record per unit.
pub mod dispatching;
pub mod reporting;
pub mod running;
