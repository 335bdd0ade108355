//! Turning a starting position into a playable scenario
//!
//! A starting position may ask for the whole scenario to be generated, may
//! reference a map file, or may ask for a generated map. Resolution never
//! mutates the caller's scenario: it returns a new value.

use warband_shared::{GeneratorConfig, GeneratorParams, ScenarioConfig};

use crate::error::{CampaignError, GenerationError, MapLoadError};

/// External random scenario and map generator.
pub trait ScenarioGenerator {
    /// Generate a complete scenario.
    fn generate_scenario(
        &mut self,
        params: &GeneratorParams,
        generator: Option<&GeneratorConfig>,
    ) -> Result<ScenarioConfig, GenerationError>;

    /// Generate map data.
    fn generate_map(
        &mut self,
        params: &GeneratorParams,
        generator: Option<&GeneratorConfig>,
    ) -> Result<String, GenerationError>;
}

/// Storage of map files.
pub trait MapStore {
    /// Read the map data behind a map reference.
    fn read_map(&self, reference: &str) -> Result<String, MapLoadError>;
}

/// Generator for builds without random generation. Every request fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

impl DisabledGenerator {
    fn error(generator: Option<&GeneratorConfig>) -> GenerationError {
        let name = generator.map_or("default", |g| g.name.as_str());
        GenerationError::new(name, "random generation is not available")
    }
}

impl ScenarioGenerator for DisabledGenerator {
    fn generate_scenario(
        &mut self,
        _params: &GeneratorParams,
        generator: Option<&GeneratorConfig>,
    ) -> Result<ScenarioConfig, GenerationError> {
        Err(Self::error(generator))
    }

    fn generate_map(
        &mut self,
        _params: &GeneratorParams,
        generator: Option<&GeneratorConfig>,
    ) -> Result<String, GenerationError> {
        Err(Self::error(generator))
    }
}

/// Resolves starting positions through a generator and a map store.
pub struct ScenarioResolver<'a> {
    generator: &'a mut dyn ScenarioGenerator,
    maps: &'a dyn MapStore,
}

impl<'a> ScenarioResolver<'a> {
    pub fn new(generator: &'a mut dyn ScenarioGenerator, maps: &'a dyn MapStore) -> Self {
        Self { generator, maps }
    }

    /// Produce a concrete scenario from `scenario`.
    ///
    /// 1. A requested scenario generation replaces the scenario entirely.
    /// 2. Without inline map data, a map reference is read from the store.
    /// 3. Still without map data, a requested map generation is spliced in.
    ///
    /// Carryover is not merged into generated scenarios; sides receive it
    /// later through the regular expansion by save id.
    pub fn resolve(&mut self, scenario: &ScenarioConfig) -> Result<ScenarioConfig, CampaignError> {
        let mut resolved = if scenario.wants_scenario_generation() {
            tracing::info!(target: "engine", scenario = %scenario.id, "Randomly generating scenario");
            self.generator
                .generate_scenario(&scenario.scenario_generation, scenario.generator.as_ref())?
        } else {
            scenario.clone()
        };

        if resolved.map_data.is_empty() && !resolved.map.is_empty() {
            tracing::debug!(target: "engine", map = %resolved.map, "Reading map");
            resolved.map_data = self.maps.read_map(&resolved.map)?;
        }

        if resolved.map_data.is_empty() && resolved.wants_map_generation() {
            tracing::info!(target: "engine", scenario = %resolved.id, "Randomly generating map");
            resolved.map_data = self
                .generator
                .generate_map(&resolved.map_generation, resolved.generator.as_ref())?;
        }

        Ok(resolved)
    }
}

/// Map store without any maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMaps;

impl MapStore for NoMaps {
    fn read_map(&self, reference: &str) -> Result<String, MapLoadError> {
        Err(MapLoadError::NotFound(reference.to_string()))
    }
}
