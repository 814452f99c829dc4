/// A single image tag to apply and optionally push.
///
/// `short_label` feeds action names (`tag-<short_label>`), `value` is the
/// literal tag applied to the image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTag {
    pub short_label: String,
    pub description: String,
    pub value: String,
}

impl ImageTag {
    pub fn new(
        short_label: impl Into<String>,
        description: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        ImageTag {
            short_label: short_label.into(),
            description: description.into(),
            value: value.into(),
        }
    }

    /// The default placeholder tag derived from a release target's label.
    pub fn for_target_label(label: &str) -> Self {
        ImageTag::new(
            label,
            format!("Tag image with '{}'", label),
            label,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_target_label() {
        let tag = ImageTag::for_target_label("latest");
        assert_eq!(tag.short_label, "latest");
        assert_eq!(tag.value, "latest");
        assert_eq!(tag.description, "Tag image with 'latest'");
    }
}
