use axum::{ extract::State, response::Response, Json };
use serde::Deserialize;

use crate::enums::{ ModuleShape, QualityTier };
use crate::error::{ AppError, Result };
use crate::qr::RenderStyle;
use crate::services::{ GenerationRequest, LogoSource };

use super::{ png_response, AppState };

#[derive(Deserialize, Default)]
pub struct StyleBody {
    #[serde(default)]
    pub shape: ModuleShape,
    #[serde(default)]
    pub corner_radius: f32,
}

#[derive(Deserialize)]
pub struct RenderBody {
    pub payload: String,
    pub quality: QualityTier,
    #[serde(default)]
    pub style: Option<StyleBody>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub logo_base64: Option<String>,
}

impl RenderBody {
    pub fn into_request(self) -> Result<GenerationRequest> {
        let style = self.style.unwrap_or_default();
        let style = RenderStyle::new(style.shape, style.corner_radius)?;

        let logo = match (self.logo_url, self.logo_base64) {
            (Some(_), Some(_)) => {
                return Err(
                    AppError::InvalidInput(
                        "Provide either logo_url or logo_base64, not both".to_string()
                    )
                );
            }
            (Some(url), None) => Some(LogoSource::Url(url)),
            (None, Some(encoded)) => Some(LogoSource::Inline(encoded)),
            (None, None) => None,
        };

        Ok(GenerationRequest {
            payload: self.payload,
            quality: self.quality,
            style,
            logo,
        })
    }
}

/// Unmetered render straight to PNG.
pub async fn render_qr(State(state): State<AppState>, Json(body): Json<RenderBody>) -> Result<Response> {
    let request = body.into_request()?;
    let logo = state.logo_fetcher.resolve(request.logo.as_ref()).await;

    let image = state.render_service.render(
        &request.payload,
        request.quality,
        request.style,
        logo
    ).await?;

    Ok(png_response(image.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> RenderBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_to_square_without_logo() {
        let request = body(r#"{"payload":"x","quality":"standard"}"#).into_request().unwrap();

        assert_eq!(request.style, RenderStyle::square());
        assert!(request.logo.is_none());
    }

    #[test]
    fn test_inline_logo_and_style() {
        let request = body(
            r#"{"payload":"x","quality":"ultra","style":{"shape":"circle"},"logo_base64":"aGk="}"#
        )
            .into_request()
            .unwrap();

        assert_eq!(request.style.shape(), ModuleShape::Circle);
        assert_eq!(request.logo, Some(LogoSource::Inline("aGk=".to_string())));
    }

    #[test]
    fn test_rejects_two_logo_sources() {
        let result = body(
            r#"{"payload":"x","quality":"high","logo_url":"http://a/b.png","logo_base64":"aGk="}"#
        ).into_request();

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_out_of_range_corner_radius() {
        let result = body(
            r#"{"payload":"x","quality":"high","style":{"corner_radius":1.5}}"#
        ).into_request();

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
