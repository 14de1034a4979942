//! Dashboard definition domain models.
//!
//! Dashboards are named widget layouts. Widgets reference analytics data by a
//! data-source key that callers resolve lazily.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Visual kind of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Chart,
    Metric,
    Table,
    Gauge,
    List,
}

/// Grid dimensions of a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self { columns: 12, rows: 8 }
    }
}

/// Grid position and size of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPosition {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: String,
    pub kind: WidgetKind,
    pub title: String,
    pub data_source_key: String,
    #[serde(default)]
    pub configuration: HashMap<String, serde_json::Value>,
    pub position: WidgetPosition,
}

/// A stored dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub widgets: Vec<Widget>,
    pub layout: GridLayout,
    pub is_public: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Widget definition as supplied by clients; `id` is assigned when absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetInput {
    #[serde(default)]
    pub id: Option<String>,
    pub kind: WidgetKind,
    pub title: String,
    pub data_source_key: String,
    #[serde(default)]
    pub configuration: HashMap<String, serde_json::Value>,
    pub position: WidgetPosition,
}

impl WidgetInput {
    pub fn into_widget(self) -> Widget {
        Widget {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            kind: self.kind,
            title: self.title,
            data_source_key: self.data_source_key,
            configuration: self.configuration,
            position: self.position,
        }
    }
}

/// Request payload for creating a dashboard.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_widgets"))]
pub struct CreateDashboardRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,

    #[serde(default)]
    pub widgets: Vec<WidgetInput>,

    #[serde(default)]
    pub layout: GridLayout,

    #[serde(default)]
    pub is_public: bool,

    #[validate(length(min = 1, max = 100, message = "createdBy must be 1-100 characters"))]
    pub created_by: String,
}

/// Request payload for a partial dashboard update.
///
/// Only fields that are present are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDashboardRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub widgets: Option<Vec<WidgetInput>>,

    pub layout: Option<GridLayout>,

    pub is_public: Option<bool>,
}

impl UpdateDashboardRequest {
    /// Checks the merged result of applying this request to `current`: the
    /// resulting widgets must fit the resulting layout.
    pub fn validate_against(&self, current: &Dashboard) -> Result<(), ValidationError> {
        let layout = self.layout.unwrap_or(current.layout);
        validate_grid(&layout)?;
        match &self.widgets {
            Some(widgets) => validate_widgets(widgets, &layout),
            None => widgets_fit(&current.widgets, &layout),
        }
    }
}

/// Response for listing dashboards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDashboardsResponse {
    pub dashboards: Vec<Dashboard>,
    pub total: usize,
}

fn validate_grid(layout: &GridLayout) -> Result<(), ValidationError> {
    shared::validation::validate_grid_dimension(layout.columns)?;
    shared::validation::validate_grid_dimension(layout.rows)
}

fn validate_widgets(widgets: &[WidgetInput], layout: &GridLayout) -> Result<(), ValidationError> {
    for widget in widgets {
        shared::validation::validate_widget_title(&widget.title)?;
        shared::validation::validate_data_source_key(&widget.data_source_key)?;
        let p = widget.position;
        shared::validation::validate_widget_placement(
            p.x,
            p.y,
            p.width,
            p.height,
            layout.columns,
            layout.rows,
        )?;
    }
    Ok(())
}

fn widgets_fit(widgets: &[Widget], layout: &GridLayout) -> Result<(), ValidationError> {
    for widget in widgets {
        let p = widget.position;
        shared::validation::validate_widget_placement(
            p.x,
            p.y,
            p.width,
            p.height,
            layout.columns,
            layout.rows,
        )?;
    }
    Ok(())
}

fn validate_create_widgets(request: &CreateDashboardRequest) -> Result<(), ValidationError> {
    validate_grid(&request.layout)?;
    validate_widgets(&request.widgets, &request.layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(x: u32, y: u32, width: u32, height: u32) -> WidgetInput {
        WidgetInput {
            id: None,
            kind: WidgetKind::Chart,
            title: "Revenue".to_string(),
            data_source_key: "revenue.byService".to_string(),
            configuration: HashMap::new(),
            position: WidgetPosition { x, y, width, height },
        }
    }

    fn create_request(widgets: Vec<WidgetInput>) -> CreateDashboardRequest {
        CreateDashboardRequest {
            name: "Front desk".to_string(),
            description: String::new(),
            widgets,
            layout: GridLayout::default(),
            is_public: false,
            created_by: "manager".to_string(),
        }
    }

    #[test]
    fn test_widget_kind_serialization() {
        assert_eq!(serde_json::to_string(&WidgetKind::Gauge).unwrap(), "\"gauge\"");
        let kind: WidgetKind = serde_json::from_str("\"list\"").unwrap();
        assert_eq!(kind, WidgetKind::List);
    }

    #[test]
    fn test_widget_input_assigns_id() {
        let assigned = widget(0, 0, 1, 1).into_widget();
        assert!(Uuid::parse_str(&assigned.id).is_ok());

        let mut input = widget(0, 0, 1, 1);
        input.id = Some("w-1".to_string());
        assert_eq!(input.into_widget().id, "w-1");
    }

    #[test]
    fn test_create_request_valid() {
        let request = create_request(vec![widget(0, 0, 6, 4), widget(6, 0, 6, 4)]);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_widget_outside_grid() {
        let request = create_request(vec![widget(10, 0, 4, 2)]);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_empty_name() {
        let mut request = create_request(vec![]);
        request.name = String::new();
        assert!(request.validate().is_err());
    }

    fn stored(layout: GridLayout, widgets: Vec<WidgetInput>) -> Dashboard {
        let now = Utc::now();
        Dashboard {
            id: Uuid::new_v4(),
            name: "Overview".to_string(),
            description: String::new(),
            widgets: widgets.into_iter().map(WidgetInput::into_widget).collect(),
            layout,
            is_public: true,
            created_by: "manager".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_update_validate_against_layout() {
        let update = UpdateDashboardRequest {
            widgets: Some(vec![widget(0, 0, 20, 1)]),
            ..Default::default()
        };
        assert!(update
            .validate_against(&stored(GridLayout::default(), vec![]))
            .is_err());
        assert!(update
            .validate_against(&stored(GridLayout { columns: 24, rows: 8 }, vec![]))
            .is_ok());
    }

    #[test]
    fn test_layout_shrink_must_fit_existing_widgets() {
        let current = stored(GridLayout::default(), vec![widget(8, 0, 4, 2)]);

        let shrink = UpdateDashboardRequest {
            layout: Some(GridLayout { columns: 10, rows: 8 }),
            ..Default::default()
        };
        assert!(shrink.validate_against(&current).is_err());

        let shrink_with_widgets = UpdateDashboardRequest {
            layout: Some(GridLayout { columns: 10, rows: 8 }),
            widgets: Some(vec![widget(0, 0, 4, 2)]),
            ..Default::default()
        };
        assert!(shrink_with_widgets.validate_against(&current).is_ok());

        let rename = UpdateDashboardRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert!(rename.validate_against(&current).is_ok());
    }

    #[test]
    fn test_update_request_deserialize_partial() {
        let update: UpdateDashboardRequest = serde_json::from_str(r#"{"name":"X"}"#).unwrap();
        assert_eq!(update.name.as_deref(), Some("X"));
        assert!(update.widgets.is_none());
        assert!(update.layout.is_none());
        assert!(update.is_public.is_none());
    }
}
