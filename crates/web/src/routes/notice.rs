//! One-shot notices carried across redirects.
//!
//! Handlers redirect with `?error=<code>` or `?success=<code>`; pages map
//! the code to fixed text. Unknown codes render nothing, so arbitrary query
//! text is never echoed back.

/// Query parameters for error/success display.
#[derive(Debug, Default)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// A notice ready for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub is_error: bool,
    pub text: &'static str,
}

fn error_text(code: &str) -> Option<&'static str> {
    match code {
        "email_taken" => Some("Email already registered!"),
        "invalid_credentials" => Some("Invalid email or password!"),
        "login_required" => Some("Please log in first!"),
        _ => None,
    }
}

fn success_text(code: &str) -> Option<&'static str> {
    match code {
        "registered" => Some("Signup successful! Please login."),
        "logged_in" => Some("Login successful!"),
        "logged_out" => Some("Logged out successfully!"),
        "product_added" => Some("Product added successfully!"),
        "product_updated" => Some("Product updated successfully!"),
        "product_deleted" => Some("Product deleted successfully!"),
        _ => None,
    }
}

impl MessageQuery {
    /// Pick `error` and `success` out of decoded query-string pairs. The
    /// first occurrence of a key wins.
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "error" => &mut query.error,
                "success" => &mut query.success,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.as_ref().to_owned());
            }
        }
        query
    }

    /// Resolve the notice to show, errors first.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        let error = self.error.as_deref().and_then(error_text).map(|text| Notice {
            is_error: true,
            text,
        });
        error.or_else(|| {
            self.success
                .as_deref()
                .and_then(success_text)
                .map(|text| Notice {
                    is_error: false,
                    text,
                })
        })
    }
}
