use crate::problem::node::NodeIdx;

/// Guided local search memory: how many times each arc was penalized.
#[derive(Debug, Clone)]
pub struct Penalties {
    size: usize,
    counts: Vec<u32>,
}

impl Penalties {
    pub fn new(size: usize) -> Self {
        Penalties {
            size,
            counts: vec![0; size * size],
        }
    }

    #[inline(always)]
    pub fn get(&self, from: NodeIdx, to: NodeIdx) -> u32 {
        self.counts[from.get() * self.size + to.get()]
    }

    pub fn increment(&mut self, from: NodeIdx, to: NodeIdx) {
        self.counts[from.get() * self.size + to.get()] += 1;
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&count| u64::from(count)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penalties_are_directional() {
        let mut penalties = Penalties::new(3);
        penalties.increment(NodeIdx::new(0), NodeIdx::new(2));
        penalties.increment(NodeIdx::new(0), NodeIdx::new(2));

        assert_eq!(penalties.get(NodeIdx::new(0), NodeIdx::new(2)), 2);
        assert_eq!(penalties.get(NodeIdx::new(2), NodeIdx::new(0)), 0);
        assert_eq!(penalties.total(), 2);
    }
}
