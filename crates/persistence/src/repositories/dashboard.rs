//! In-memory dashboard repository.

use chrono::{DateTime, Duration, Utc};
use domain::models::{CreateDashboardRequest, Dashboard, UpdateDashboardRequest, WidgetInput};
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::ValidationError;

/// Repository of dashboard definitions, kept in creation order.
#[derive(Debug, Default)]
pub struct DashboardRepository {
    dashboards: RwLock<Vec<Dashboard>>,
}

impl DashboardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new dashboard. The request is expected to be validated.
    pub async fn create(&self, request: CreateDashboardRequest) -> Dashboard {
        let now = Utc::now();
        let dashboard = Dashboard {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description,
            widgets: request
                .widgets
                .into_iter()
                .map(WidgetInput::into_widget)
                .collect(),
            layout: request.layout,
            is_public: request.is_public,
            created_by: request.created_by,
            created_at: now,
            updated_at: now,
        };

        self.dashboards.write().await.push(dashboard.clone());
        dashboard
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<Dashboard> {
        self.dashboards
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub async fn list(&self) -> Vec<Dashboard> {
        self.dashboards.read().await.clone()
    }

    /// Applies the provided fields to dashboard `id`.
    ///
    /// The merged widgets are checked against the merged layout while the
    /// write lock is held, so a concurrent update cannot slip in between the
    /// check and the write. Returns `Ok(None)` when no such dashboard exists.
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDashboardRequest,
    ) -> Result<Option<Dashboard>, ValidationError> {
        let mut dashboards = self.dashboards.write().await;
        let Some(dashboard) = dashboards.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        request.validate_against(dashboard)?;

        if let Some(name) = request.name {
            dashboard.name = name;
        }
        if let Some(description) = request.description {
            dashboard.description = description;
        }
        if let Some(widgets) = request.widgets {
            dashboard.widgets = widgets.into_iter().map(WidgetInput::into_widget).collect();
        }
        if let Some(layout) = request.layout {
            dashboard.layout = layout;
        }
        if let Some(is_public) = request.is_public {
            dashboard.is_public = is_public;
        }
        dashboard.updated_at = next_updated_at(dashboard.updated_at, Utc::now());

        Ok(Some(dashboard.clone()))
    }

    pub async fn count(&self) -> usize {
        self.dashboards.read().await.len()
    }
}

/// `updated_at` strictly increases even when the clock has not moved.
fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{GridLayout, WidgetKind, WidgetPosition};
    use std::collections::HashMap;

    fn widget_input(title: &str) -> WidgetInput {
        WidgetInput {
            id: None,
            kind: WidgetKind::Metric,
            title: title.to_string(),
            data_source_key: "revenue.totalRevenue".to_string(),
            configuration: HashMap::new(),
            position: WidgetPosition {
                x: 0,
                y: 0,
                width: 3,
                height: 2,
            },
        }
    }

    fn create_request(name: &str) -> CreateDashboardRequest {
        CreateDashboardRequest {
            name: name.to_string(),
            description: "Shop floor overview".to_string(),
            widgets: vec![widget_input("Revenue today")],
            layout: GridLayout::default(),
            is_public: true,
            created_by: "manager".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_timestamps() {
        let repo = DashboardRepository::new();
        let dashboard = repo.create(create_request("Overview")).await;

        assert_eq!(dashboard.created_at, dashboard.updated_at);
        assert_eq!(dashboard.widgets.len(), 1);
        assert!(Uuid::parse_str(&dashboard.widgets[0].id).is_ok());
        assert_eq!(repo.find_by_id(dashboard.id).await, Some(dashboard));
    }

    #[tokio::test]
    async fn test_list_in_creation_order() {
        let repo = DashboardRepository::new();
        repo.create(create_request("A")).await;
        repo.create(create_request("B")).await;
        repo.create(create_request("C")).await;

        let names: Vec<String> = repo.list().await.into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_name_only_update_changes_only_name_and_updated_at() {
        let repo = DashboardRepository::new();
        let before = repo.create(create_request("Overview")).await;

        let after = repo
            .update(
                before.id,
                UpdateDashboardRequest {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(after.name, "Renamed");
        assert!(after.updated_at > before.updated_at);
        assert_eq!(
            Dashboard {
                name: before.name.clone(),
                updated_at: before.updated_at,
                ..after.clone()
            },
            before
        );
    }

    #[tokio::test]
    async fn test_update_replaces_widgets_and_layout() {
        let repo = DashboardRepository::new();
        let before = repo.create(create_request("Overview")).await;

        let after = repo
            .update(
                before.id,
                UpdateDashboardRequest {
                    widgets: Some(vec![widget_input("Queue"), widget_input("Bays")]),
                    layout: Some(GridLayout { columns: 6, rows: 6 }),
                    is_public: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(after.widgets.len(), 2);
        assert_eq!(after.layout, GridLayout { columns: 6, rows: 6 });
        assert!(!after.is_public);
        assert_eq!(after.description, before.description);
    }

    #[tokio::test]
    async fn test_update_missing_is_none() {
        let repo = DashboardRepository::new();
        let result = repo
            .update(Uuid::new_v4(), UpdateDashboardRequest::default())
            .await;
        assert!(matches!(result, Ok(None)));
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_layout_shrink_rejected_and_dashboard_unchanged() {
        let repo = DashboardRepository::new();
        let mut request = create_request("Overview");
        request.widgets[0].position.x = 9;
        let before = repo.create(request).await;

        let result = repo
            .update(
                before.id,
                UpdateDashboardRequest {
                    name: Some("Narrow".to_string()),
                    layout: Some(GridLayout { columns: 10, rows: 8 }),
                    ..Default::default()
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(repo.find_by_id(before.id).await, Some(before));
    }

    #[tokio::test]
    async fn test_concurrent_layout_and_widget_updates_never_overflow() {
        let repo = std::sync::Arc::new(DashboardRepository::new());
        let before = repo.create(create_request("Overview")).await;

        let mut wide = widget_input("Wide");
        wide.position = WidgetPosition {
            x: 8,
            y: 0,
            width: 4,
            height: 2,
        };

        let shrink = {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.update(
                    before.id,
                    UpdateDashboardRequest {
                        layout: Some(GridLayout { columns: 6, rows: 8 }),
                        ..Default::default()
                    },
                )
                .await
            })
        };
        let widen = {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.update(
                    before.id,
                    UpdateDashboardRequest {
                        widgets: Some(vec![wide]),
                        ..Default::default()
                    },
                )
                .await
            })
        };
        let (shrink, widen) = (shrink.await.unwrap(), widen.await.unwrap());

        // Whichever runs second sees the other's result and is rejected.
        assert!(shrink.is_err() || widen.is_err());
        let stored = repo.find_by_id(before.id).await.unwrap();
        for widget in &stored.widgets {
            assert!(widget.position.x + widget.position.width <= stored.layout.columns);
        }
    }

    #[test]
    fn test_updated_at_strictly_increases() {
        let previous = Utc::now();
        assert_eq!(
            next_updated_at(previous, previous),
            previous + Duration::microseconds(1)
        );
        let later = previous + Duration::seconds(1);
        assert_eq!(next_updated_at(previous, later), later);
    }
}
