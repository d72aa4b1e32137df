use indexmap::IndexMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned, de::value::MapDeserializer};
use serde_json::Value;
use thiserror::Error;

/// Plugin command arguments or plugin parameters as the engine supplies them: an ordered map of
/// names to string values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CommandArgs(IndexMap<String, String>);

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ArgsError(#[from] serde_json::Error);

impl CommandArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.0.insert(key.into(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Decodes the arguments into `T`.
    ///
    /// Each value is read as JSON when it parses as JSON, so `"3"` fills a numeric field and
    /// `"true"` a boolean one. Anything else is passed through as a string. Blank values count as
    /// missing so that `#[serde(default)]` applies to them.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ArgsError> {
        let deserializer = MapDeserializer::<_, serde_json::Error>::new(
            self.0
                .iter()
                .filter(|(_, v)| !v.trim().is_empty())
                .map(|(k, v)| (k.clone(), parse_value(v))),
        );

        Ok(T::deserialize(deserializer)?)
    }
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CommandArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod test {
    use serde::Deserialize;

    use super::CommandArgs;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        texture_id: u32,
        #[serde(default)]
        label: Option<String>,
        #[serde(default = "minus_one")]
        width: i32,
    }

    fn minus_one() -> i32 {
        -1
    }

    #[test]
    fn numeric_strings_decode_into_numbers() {
        let args = CommandArgs::new()
            .with("textureId", "7")
            .with("label", "hello world");

        let sample: Sample = args.decode().unwrap();

        assert_eq!(
            Sample {
                texture_id: 7,
                label: Some("hello world".to_owned()),
                width: -1,
            },
            sample
        );
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let args: CommandArgs = [("textureId", "2"), ("width", "  ")].into_iter().collect();

        let sample: Sample = args.decode().unwrap();

        assert_eq!(-1, sample.width);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let err = CommandArgs::new()
            .with("label", "x")
            .decode::<Sample>()
            .unwrap_err();

        assert!(err.to_string().contains("textureId"), "{err}");
    }
}
