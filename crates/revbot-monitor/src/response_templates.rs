use anyhow::{bail, Result};

/// Placeholder substituted with the configured minimum tip amount when the
/// require-tip template is assembled.
pub const MINIMUM_TIP_PLACEHOLDER: &str = "<$MINIMUM_TIP_COUNT>";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Fully assembled auto-response texts.
///
/// Each body is the prefix concatenated with its configured template, so any
/// posted response can later be recognized through a prefix substring check.
pub struct ResponseTemplates {
    pub prefix: String,
    pub create_revision: String,
    pub require_likes: String,
    pub require_tip: String,
}

impl ResponseTemplates {
    /// Assemble the response texts from their configured parts, substituting
    /// the minimum-tip placeholder at load time.
    pub fn assemble(
        prefix: &str,
        create_revision: &str,
        require_likes: &str,
        require_tip: &str,
        minimum_tip_amount: i64,
    ) -> Result<Self> {
        if prefix.trim().is_empty() {
            bail!("auto_response_prefix must not be empty");
        }
        let require_tip =
            require_tip.replace(MINIMUM_TIP_PLACEHOLDER, &minimum_tip_amount.to_string());
        for (label, body) in [
            ("auto_response_create_revision", create_revision),
            ("auto_response_require_likes", require_likes),
            ("auto_response_require_tip", require_tip.as_str()),
        ] {
            if body.trim().is_empty() {
                bail!("{label} must not be empty");
            }
        }
        Ok(Self {
            prefix: prefix.to_string(),
            create_revision: format!("{prefix}{create_revision}"),
            require_likes: format!("{prefix}{require_likes}"),
            require_tip: format!("{prefix}{require_tip}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ResponseTemplates;

    #[test]
    fn functional_assemble_prefixes_bodies_and_substitutes_minimum_tip() {
        let templates = ResponseTemplates::assemble(
            "[bot] ",
            "Revision created.",
            "Please like the project first.",
            "Please tip at least <$MINIMUM_TIP_COUNT> credits.",
            15,
        )
        .expect("assemble templates");

        assert_eq!(templates.prefix, "[bot] ");
        assert_eq!(templates.create_revision, "[bot] Revision created.");
        assert_eq!(templates.require_likes, "[bot] Please like the project first.");
        assert_eq!(
            templates.require_tip,
            "[bot] Please tip at least 15 credits."
        );
        assert!(templates.create_revision.contains(&templates.prefix));
    }

    #[test]
    fn unit_assemble_rejects_empty_prefix() {
        let error = ResponseTemplates::assemble("  ", "a", "b", "c", 0)
            .expect_err("empty prefix should fail");
        assert!(error.to_string().contains("auto_response_prefix"));
    }

    #[test]
    fn regression_assemble_rejects_blank_bodies() {
        let error = ResponseTemplates::assemble("[bot] ", "a", "   ", "c", 0)
            .expect_err("blank body should fail");
        assert!(error.to_string().contains("auto_response_require_likes"));
    }
}
