use rand::Rng;

/// Drops outgoing datagrams at random to exercise the self-healing SYNC stream.
#[derive(Debug, Clone, Default)]
pub struct PacketLossSimulation {
    pub enabled: bool,
    /// Fraction of sends dropped, in `[0, 1]`.
    pub loss_chance: f64,
}

impl PacketLossSimulation {
    pub fn new(loss_chance: f64) -> Self {
        Self {
            enabled: loss_chance > 0.0,
            loss_chance: loss_chance.clamp(0.0, 1.0),
        }
    }

    pub fn should_drop(&self) -> bool {
        if !self.enabled || self.loss_chance <= 0.0 {
            return false;
        }
        rand::thread_rng().gen_bool(self.loss_chance.min(1.0))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub packets_dropped: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl NetworkStats {
    pub fn record_sent(&mut self, bytes: usize) {
        self.packets_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    pub fn record_received(&mut self, bytes: usize) {
        self.packets_received += 1;
        self.bytes_received += bytes as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_simulation_never_drops() {
        let sim = PacketLossSimulation::default();
        assert!((0..100).all(|_| !sim.should_drop()));
    }

    #[test]
    fn full_loss_always_drops() {
        let sim = PacketLossSimulation::new(1.0);
        assert!((0..100).all(|_| sim.should_drop()));
    }
}
