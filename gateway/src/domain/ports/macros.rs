//! Macro for port errors that carry a single adapter-supplied message.

/// Declare an error enum whose variants each hold a `message: String`.
///
/// Every variant displays its message verbatim and gets a snake_case
/// constructor taking `impl Into<String>` plus an `is_<variant>` predicate.
/// The enum also exposes [`message`](#method.message) across variants.
macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),+ $(,)?
        }
    ) => {
        ::paste::paste! {
            $(#[$outer])*
            #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
            pub enum $name {
                $(
                    $(#[$variant_meta])*
                    #[error("{message}")]
                    $variant {
                        /// Description supplied by the adapter.
                        message: String,
                    },
                )+
            }

            impl $name {
                $(
                    #[doc = "Construct the `" $variant "` variant."]
                    pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                        Self::$variant {
                            message: message.into(),
                        }
                    }

                    #[doc = "Whether this is the `" $variant "` variant."]
                    #[must_use]
                    pub const fn [<is_ $variant:snake>](&self) -> bool {
                        matches!(self, Self::$variant { .. })
                    }
                )+

                /// Adapter-supplied description, whatever the variant.
                #[must_use]
                pub fn message(&self) -> &str {
                    match self {
                        $( Self::$variant { message } )|+ => message,
                    }
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum UpstreamError {
            Refused,
            TimedOut,
        }
    }

    #[rstest]
    #[case(UpstreamError::refused("refused by api.kaiflow.test"), true, false)]
    #[case(UpstreamError::timed_out(String::from("gave up after 250 ms")), false, true)]
    fn constructors_pick_the_variant(
        #[case] error: UpstreamError,
        #[case] refused: bool,
        #[case] timed_out: bool,
    ) {
        assert_eq!(error.is_refused(), refused);
        assert_eq!(error.is_timed_out(), timed_out);
    }

    #[rstest]
    fn display_and_message_are_the_description() {
        let error = UpstreamError::timed_out("gave up after 250 ms");
        assert_eq!(error.to_string(), "gave up after 250 ms");
        assert_eq!(error.message(), "gave up after 250 ms");
    }
}
