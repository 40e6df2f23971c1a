//! The server the sequence hands off to.

/// ASGI runner module invoked through the environment's interpreter.
pub const ASGI_RUNNER: &str = "uvicorn";

/// Fixed launch contract for the scheduler service.
///
/// Host, port and reload are constants; the server owns any further
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchTarget {
    /// Module-qualified application object.
    pub app: &'static str,
    pub host: &'static str,
    pub port: u16,
    /// Restart the server when its source tree changes.
    pub reload: bool,
}

impl LaunchTarget {
    pub const SCHEDULER: LaunchTarget = LaunchTarget {
        app: "app.main:app",
        host: "0.0.0.0",
        port: 8000,
        reload: true,
    };

    /// Interpreter arguments that start the ASGI runner for this target.
    pub fn interpreter_args(&self) -> Vec<String> {
        let mut args = vec![
            "-m".to_string(),
            ASGI_RUNNER.to_string(),
            self.app.to_string(),
            "--host".to_string(),
            self.host.to_string(),
            "--port".to_string(),
            self.port.to_string(),
        ];
        if self.reload {
            args.push("--reload".to_string());
        }
        args
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
