use std::{borrow::Cow, env, fmt, fmt::Display, str::FromStr};

use anyhow::{Context, anyhow};
#[cfg(any(test, feature = "test-utils"))]
use proptest_derive::Arbitrary;
use serde::Serialize;
use serde_with::DeserializeFromStr;
use strum::VariantArray;

/// Represents a validated `DEPLOY_ENVIRONMENT` configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[derive(DeserializeFromStr, VariantArray)]
#[cfg_attr(any(test, feature = "test-utils"), derive(Arbitrary))]
pub enum DeployEnv {
    /// "dev"
    Dev,
    /// "staging"
    Staging,
    /// "prod"
    Prod,
}

impl DeployEnv {
    /// Read a [`DeployEnv`] from env, or err if it was invalid / didn't exist.
    pub fn from_env() -> anyhow::Result<Self> {
        let s = env::var("DEPLOY_ENVIRONMENT")
            .context("DEPLOY_ENVIRONMENT was not set")?;
        Self::from_str(&s)
    }

    /// Shorthand to check whether this [`DeployEnv`] is dev.
    #[inline]
    pub fn is_dev(self) -> bool {
        matches!(self, Self::Dev)
    }

    /// Shorthand to check whether this [`DeployEnv`] is staging or prod.
    #[inline]
    pub fn is_staging_or_prod(self) -> bool {
        matches!(self, Self::Staging | Self::Prod)
    }

    /// Get a [`str`] containing "dev", "staging", or "prod"
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }

    /// Returns the base API URL for this deploy environment.
    ///
    /// A custom API URL (e.g. from env) can be provided for dev.
    pub fn api_url(
        &self,
        dev_api_url: Option<Cow<'static, str>>,
    ) -> Cow<'static, str> {
        match self {
            Self::Dev =>
                dev_api_url.unwrap_or(Cow::Borrowed("https://localhost:5000")),
            Self::Staging =>
                Cow::Borrowed("https://api.staging.hirearrive.in"),
            Self::Prod => Cow::Borrowed("https://api.hirearrive.in"),
        }
    }
}

impl FromStr for DeployEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "dev" => Ok(Self::Dev),
            "staging" => Ok(Self::Staging),
            "prod" => Ok(Self::Prod),
            _ => Err(anyhow!(
                "Unrecognized DEPLOY_ENVIRONMENT '{s}': \
                must be 'dev', 'staging', or 'prod'"
            )),
        }
    }
}

impl Display for DeployEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeployEnv {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deploy_env_roundtrip() {
        let all = serde_json::to_string(DeployEnv::VARIANTS).unwrap();
        assert_eq!(all, r#"["dev","staging","prod"]"#);

        for env in DeployEnv::VARIANTS {
            let json = serde_json::to_string(env).unwrap();
            let env2: DeployEnv = serde_json::from_str(&json).unwrap();
            assert_eq!(*env, env2);

            let env3 = DeployEnv::from_str(env.as_str()).unwrap();
            assert_eq!(*env, env3);
            assert_eq!(env.as_str(), env.to_string());
        }

        assert!(DeployEnv::from_str("production").is_err());
    }

    #[test]
    fn api_url_dev_override() {
        let url = DeployEnv::Dev.api_url(Some(Cow::Borrowed("https://x.y")));
        assert_eq!(url, "https://x.y");
        let url = DeployEnv::Prod.api_url(None);
        assert_eq!(url, "https://api.hirearrive.in");
    }
}
