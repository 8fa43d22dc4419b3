use thiserror::Error;

#[derive(Debug, Error)]
pub enum BedrockError {
    #[error("model invocation failed: {0}")]
    Invocation(String),

    #[error("invalid conversation message: {0}")]
    InvalidMessage(String),

    #[error("request is blank")]
    BlankRequest,
}

/// Walk the full error chain and join all causes into one string.
///
/// AWS SDK errors often have terse `Display` impls (e.g. "service error")
/// but useful detail in the source chain.
pub fn format_err_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn chain_joins_every_cause() {
        assert_eq!(format_err_chain(&Outer(Inner)), "outer: inner");
    }
}
