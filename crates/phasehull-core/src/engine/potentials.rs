use crate::core::geometry::exact::Rational;
use crate::core::models::ids::EndpointId;

/// Outcome of observing a pure-endpoint score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PotentialUpdate {
    /// First value recorded for the endpoint.
    Initialized,
    /// A lower value replaced the previous one.
    Lowered,
    /// The observation was not below the recorded value.
    Unchanged,
}

impl PotentialUpdate {
    /// Whether the normalization of existing points changed.
    pub fn invalidates_hull(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Per-endpoint chemical potentials: the lowest score per formula unit observed for each
/// endpoint. Values only ever decrease once set.
#[derive(Debug, Clone)]
pub struct ChemicalPotentials {
    values: Vec<Option<Rational>>,
}

impl ChemicalPotentials {
    pub fn new(endpoints: usize) -> Self {
        Self {
            values: vec![None; endpoints],
        }
    }

    /// Records a pure-endpoint observation, keeping the minimum.
    ///
    /// Observations for unknown endpoints are ignored.
    pub fn observe(&mut self, endpoint: EndpointId, per_formula_unit: Rational) -> PotentialUpdate {
        let Some(slot) = self.values.get_mut(endpoint.index()) else {
            return PotentialUpdate::Unchanged;
        };
        match slot {
            None => {
                *slot = Some(per_formula_unit);
                PotentialUpdate::Initialized
            }
            Some(current) if per_formula_unit < *current => {
                *current = per_formula_unit;
                PotentialUpdate::Lowered
            }
            Some(_) => PotentialUpdate::Unchanged,
        }
    }

    pub fn get(&self, endpoint: EndpointId) -> Option<&Rational> {
        self.values.get(endpoint.index()).and_then(Option::as_ref)
    }

    /// True once every endpoint has a recorded potential.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Endpoints still lacking a potential.
    pub fn missing(&self) -> impl Iterator<Item = EndpointId> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, value)| value.is_none())
            .map(|(index, _)| EndpointId(index))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
