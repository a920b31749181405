//! Tests for the venue demo.

#[cfg(test)]
mod run_tests {
    use crowd_output::VoidSink;

    use crate::{run, synthetic};

    #[test]
    fn bar_closes_halfway_through() {
        let (_, mut sim) = synthetic().unwrap();
        sim.config.total_ticks = 20;
        sim.generate_flow_fields();
        run(&mut sim, VoidSink).unwrap();

        let bar = sim.destinations.iter().find(|d| d.name == "bar").unwrap();
        assert!(!bar.open);
        assert_eq!(sim.clock.current_tick.0, 20);
        assert!(sim.admitted() > 0);
    }
}
