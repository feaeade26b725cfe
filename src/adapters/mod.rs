//! External system integrations.
//!
//! - [`elis`] - OpenELIS lab information system (read-only)
//! - [`openmrs`] - OpenMRS encounters, concepts and encounter transactions
//!
//! Both sides sit behind `async_trait` traits so workers can run against the
//! REST clients in production and the in-memory store in tests:
//!
//! ```rust,no_run
//! use bahmni_bridge::adapters::elis::OpenElisClient;
//! use bahmni_bridge::adapters::openmrs::create_openmrs_services;
//! use bahmni_bridge::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bahmni-bridge.toml")?;
//! let elis = OpenElisClient::new(&config.elis)?;
//! let services = create_openmrs_services(&config)?;
//! # Ok(())
//! # }
//! ```

pub mod elis;
pub mod openmrs;
