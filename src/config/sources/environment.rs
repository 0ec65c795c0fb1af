//! Environment source: SLIDESMITH_<SECTION>__<KEY>, e.g.
//! SLIDESMITH_PRESENTATION__REQUESTS_PER_MINUTE=30

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "SLIDESMITH";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
