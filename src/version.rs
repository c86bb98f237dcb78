use tracing::debug;

use crate::domain::StampOptions;

/// Index of the build component in `major.minor.build.revision`.
const BUILD_INDEX: usize = 2;
/// Index of the revision component in `major.minor.build.revision`.
const REVISION_INDEX: usize = 3;

/// Computes the version to stamp from the current one.
///
/// Splits on '.', and only when there are exactly four tokens increments the
/// build and/or revision component as requested. Anything else is returned
/// unchanged. A component that does not parse as an integer (or would
/// overflow) is left as it is.
///
/// # Example
/// ```ignore
/// let options = StampOptions { increment_build: true, increment_revision: false, check_in: true };
/// assert_eq!(transform_version("1.2.3.4", &options), "1.2.4.4");
/// ```
pub fn transform_version(current: &str, options: &StampOptions) -> String {
    let mut parts: Vec<String> = current.split('.').map(str::to_string).collect();
    if parts.len() != 4 {
        debug!(version = current, "not a four-part version, leaving unchanged");
        return current.to_string();
    }

    if options.increment_build {
        parts[BUILD_INDEX] = increment_component(&parts[BUILD_INDEX]);
    }
    if options.increment_revision {
        parts[REVISION_INDEX] = increment_component(&parts[REVISION_INDEX]);
    }

    parts.join(".")
}

fn increment_component(token: &str) -> String {
    match token.parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
        Some(next) => next.to_string(),
        None => {
            debug!(component = token, "component is not an incrementable integer");
            token.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(build: bool, revision: bool) -> StampOptions {
        StampOptions {
            increment_build: build,
            increment_revision: revision,
            check_in: true,
        }
    }

    #[test]
    fn test_increment_build_only() {
        assert_eq!(transform_version("1.2.3.4", &options(true, false)), "1.2.4.4");
    }

    #[test]
    fn test_increment_both() {
        assert_eq!(transform_version("1.2.3.4", &options(true, true)), "1.2.4.5");
    }

    #[test]
    fn test_increment_revision_only() {
        assert_eq!(transform_version("1.2.3.4", &options(false, true)), "1.2.3.5");
    }

    #[test]
    fn test_no_increment_is_verbatim() {
        assert_eq!(transform_version("1.2.3.4", &options(false, false)), "1.2.3.4");
    }

    #[test]
    fn test_wrong_component_count_passes_through() {
        for version in ["1.2.3", "1.2.3.4.5", "", "1"] {
            assert_eq!(transform_version(version, &options(true, true)), version);
        }
    }

    #[test]
    fn test_non_numeric_component_left_unchanged() {
        assert_eq!(transform_version("1.2.x.4", &options(true, true)), "1.2.x.5");
        assert_eq!(transform_version("1.2.3.beta", &options(true, true)), "1.2.4.beta");
    }

    #[test]
    fn test_overflow_left_unchanged() {
        let max = format!("1.2.{}.0", u64::MAX);
        assert_eq!(transform_version(&max, &options(true, false)), max);
    }

    #[test]
    fn test_carry_over_digits() {
        assert_eq!(transform_version("1.0.99.9", &options(true, true)), "1.0.100.10");
    }
}
