use http::Uri;

use super::{ConfigurationError, require_absolute};

/// Where the `InitiateAuth` call goes: the regional Cognito endpoint or a custom one.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityProvider {
    Region(String),
    Custom(Uri),
}

impl IdentityProvider {
    /// Endpoint accepting `InitiateAuth` requests.
    pub fn endpoint(&self) -> Result<Uri, ConfigurationError> {
        match self {
            Self::Region(region) => {
                if region.is_empty() {
                    return Err(ConfigurationError::MissingField("region"));
                }
                if !region
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
                {
                    return Err(ConfigurationError::InvalidRegion(region.to_owned()));
                }
                let url = format!("https://cognito-idp.{region}.amazonaws.com/");
                url.parse::<Uri>()
                    .map_err(|e| ConfigurationError::InvalidUri(url, e.to_string()))
            }
            Self::Custom(uri) => require_absolute(uri.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(
        IdentityProvider::Region("eu-west-1".to_string()),
        "https://cognito-idp.eu-west-1.amazonaws.com/"
    )]
    #[case(
        IdentityProvider::Region("ap-northeast-2".to_string()),
        "https://cognito-idp.ap-northeast-2.amazonaws.com/"
    )]
    #[case(
        IdentityProvider::Custom(Uri::from_static("http://localhost:9229")),
        "http://localhost:9229/"
    )]
    fn endpoints(#[case] provider: IdentityProvider, #[case] expected: &str) {
        assert_eq!(provider.endpoint().unwrap().to_string(), expected);
    }

    #[rstest]
    #[case::no_scheme(Uri::from_static("localhost:9229"))]
    #[case::path_only(Uri::from_static("/oauth2/token"))]
    fn custom_endpoint_without_scheme_or_host(#[case] uri: Uri) {
        assert_matches!(
            IdentityProvider::Custom(uri).endpoint(),
            Err(ConfigurationError::InvalidUri(..))
        );
    }

    #[test]
    fn empty_region() {
        assert_matches!(
            IdentityProvider::Region(String::new()).endpoint(),
            Err(ConfigurationError::MissingField("region"))
        );
    }

    #[test]
    fn invalid_region() {
        assert_matches!(
            IdentityProvider::Region("eu west/1".to_string()).endpoint(),
            Err(ConfigurationError::InvalidRegion(region)) => assert_eq!(region, "eu west/1")
        );
    }
}
