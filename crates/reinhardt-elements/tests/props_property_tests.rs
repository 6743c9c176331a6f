//! Property-based tests for props precedence and key derivation
//!
//! Uses proptest to verify properties that should hold for all valid inputs.

#[cfg(not(target_arch = "wasm32"))]
mod property_tests {
	use proptest::prelude::*;
	use proptest::proptest;
	use reinhardt_elements::props::{PropsMap, PropsResolver, prop_key};
	use serde_json::Value;

	fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	proptest! {
		/// Property: prop keys never contain hyphens
		#[test]
		fn prop_key_has_no_hyphens(
			segments in prop::collection::vec("[a-z][a-z0-9]{0,8}", 1..5)
		) {
			let name = segments.join("-");

			let key = prop_key(&name);

			prop_assert!(!key.contains('-'));
			prop_assert!(key.starts_with(segments[0].as_str()));
		}

		/// Property: prop keys keep every character except hyphens
		#[test]
		fn prop_key_preserves_letters(
			segments in prop::collection::vec("[a-z][a-z0-9]{0,8}", 1..5)
		) {
			let name = segments.join("-");

			let key = prop_key(&name);

			prop_assert_eq!(key.to_lowercase(), segments.concat());
		}

		/// Property: the `props` attribute always wins over a whitelisted attribute
		#[test]
		fn prop_json_wins_over_attribute(
			json_value in "[a-zA-Z0-9 ]{0,16}",
			attribute_value in "[a-zA-Z0-9 ]{0,16}",
			attribute_first in any::<bool>(),
		) {
			let whitelist = vec!["value".to_string()];
			let resolver = PropsResolver::new("props", &whitelist);
			let json = serde_json::json!({"value": &json_value}).to_string();
			let pairs = if attribute_first {
				attrs(&[("value", attribute_value.as_str()), ("props", json.as_str())])
			} else {
				attrs(&[("props", json.as_str()), ("value", attribute_value.as_str())])
			};

			let resolved = resolver.resolve(&pairs, None);

			prop_assert_eq!(resolved.props.get("value"), Some(&Value::String(json_value)));
		}

		/// Property: script keys survive unless the attribute layer overrides them
		#[test]
		fn prop_script_layer_is_base(
			script_value in "[a-z]{0,8}",
			attribute_value in proptest::option::of("[a-z]{0,8}"),
		) {
			let whitelist: Vec<String> = Vec::new();
			let resolver = PropsResolver::new("props", &whitelist);
			let mut script = PropsMap::new();
			script.insert("value".to_string(), Value::String(script_value.clone()));
			script.insert("kept".to_string(), Value::Bool(true));
			let pairs = match &attribute_value {
				Some(value) => {
					let json = serde_json::json!({"value": value}).to_string();
					attrs(&[("props", json.as_str())])
				}
				None => Vec::new(),
			};

			let resolved = resolver.resolve(&pairs, Some(&script));

			let expected = attribute_value.unwrap_or(script_value);
			prop_assert_eq!(resolved.props.get("value"), Some(&Value::String(expected)));
			prop_assert_eq!(resolved.props.get("kept"), Some(&Value::Bool(true)));
		}

		/// Property: attributes outside the whitelist never surface as props
		#[test]
		fn prop_unlisted_attributes_never_surface(
			name in "[a-z]{1,8}(-[a-z]{1,8})?",
			value in "[a-z]{0,8}",
		) {
			let whitelist: Vec<String> = Vec::new();
			let resolver = PropsResolver::new("props", &whitelist);
			prop_assume!(name != "props");

			let resolved = resolver.resolve(&attrs(&[(name.as_str(), value.as_str())]), None);

			prop_assert!(resolved.props.is_empty());
		}
	}
}
