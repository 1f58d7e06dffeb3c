//! Gateway and feedback endpoints.
//!
//! The notification gateway and the feedback service differ only in
//! host and port, so the pair is a configuration value rather than a
//! connection subtype.

/// Which remote service the session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// The push gateway accepting send frames.
    Gateway,
    /// The feedback service reporting dead tokens.
    Feedback,
}

/// Which certificate environment the endpoints belong to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    /// Production push environment.
    #[default]
    Production,
    /// Sandbox/development push environment.
    Sandbox,
}

const GATEWAY_PRODUCTION_HOST: &str = "gateway.push.apple.com";
const GATEWAY_SANDBOX_HOST: &str = "gateway.sandbox.push.apple.com";
const FEEDBACK_PRODUCTION_HOST: &str = "feedback.push.apple.com";
const FEEDBACK_SANDBOX_HOST: &str = "feedback.sandbox.push.apple.com";

const GATEWAY_PORT: u16 = 2195;
const FEEDBACK_PORT: u16 = 2196;

/// A resolved (host, port) pair for one service in one environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    host: &'static str,
    port: u16,
}

impl Endpoint {
    /// Resolves the endpoint for a service and environment.
    pub fn new(service: Service, environment: Environment) -> Self {
        match (service, environment) {
            (Service::Gateway, Environment::Production) => Self {
                host: GATEWAY_PRODUCTION_HOST,
                port: GATEWAY_PORT,
            },
            (Service::Gateway, Environment::Sandbox) => Self {
                host: GATEWAY_SANDBOX_HOST,
                port: GATEWAY_PORT,
            },
            (Service::Feedback, Environment::Production) => Self {
                host: FEEDBACK_PRODUCTION_HOST,
                port: FEEDBACK_PORT,
            },
            (Service::Feedback, Environment::Sandbox) => Self {
                host: FEEDBACK_SANDBOX_HOST,
                port: FEEDBACK_PORT,
            },
        }
    }

    /// Returns the hostname.
    pub fn host(&self) -> &'static str {
        self.host
    }

    /// Returns the TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
