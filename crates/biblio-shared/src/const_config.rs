//! Stores settings that are not expected to need to change but grouped together
//! for discoverability and reuse. Each constant should be prefixed by the module
//! name to allow importing the constant only and still be readable

pub mod client {
    /// Used when no base URL is configured
    pub const CLIENT_DEFAULT_API_URL: &str = "https://bibliotheque-emprunts.onrender.com";

    /// Shown for books that do not have a cover image
    pub const CLIENT_PLACEHOLDER_COVER_URL: &str = "https://images.unsplash.com/photo-1543004218-ee141104975a?q=80&w=200&h=300&auto=format&fit=crop";

    /// Prefix of the environment variables read by the client configuration
    pub const CLIENT_ENV_PREFIX: &str = "BIBLIO";
}

pub mod storage {
    /// Holds the raw bearer token
    pub const STORAGE_KEY_TOKEN: &str = "token";
    /// Holds the identity serialized as JSON
    pub const STORAGE_KEY_USER: &str = "user";
}

pub mod event {
    pub const EVENT_LOGGED_IN: &str = "auth:login";
    pub const EVENT_LOGGED_OUT: &str = "auth:logout";
    pub const EVENT_SESSION_EXPIRED: &str = "auth:unauthorized";
}

pub mod error {
    /// Displayed whenever the backend does not give us anything better
    pub const ERROR_GENERIC_MSG: &str = "Une erreur est survenue";
    /// Used for a 401 that comes without a readable reason
    pub const ERROR_SESSION_EXPIRED_MSG: &str = "Session expirée, veuillez vous reconnecter";
}

pub mod path {
    mod path_spec;
    pub use path_spec::PathSpec;
    pub const PATH_AUTH_LOGIN: PathSpec = PathSpec::post("/auth/login/unified");
    pub const PATH_AUTH_ME: PathSpec = PathSpec::get("/auth/me");
    /// Followed by the member ID
    pub const PATH_MEMBER_PREFIX: PathSpec = PathSpec::delete("/membres/");
}
