//! Path navigation: resolve a page path through the route table and load
//! the records its view shows.

use std::error::Error;

use serde::Serialize;
use tracing::{debug, warn};

use oasis_client::ApiClient;
use oasis_core::{
    Algorithm, AlgorithmId, ContainerImage, ImageId, PageRequest, Paginated, RouteTable, Task,
    View,
};

/// Where a path leads, before any records are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Home,
    Algorithm(AlgorithmId),
}

/// A view with its data loaded.
#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Page {
    Home {
        algorithms: Paginated<Algorithm>,
    },
    AlgorithmDetail {
        algorithm: Algorithm,
        image: Option<ContainerImage>,
        tasks: Paginated<Task>,
    },
}

/// Resolve `path` to a target. Paths without a route are an error.
pub fn target(routes: &RouteTable, path: &str) -> Result<Target, Box<dyn Error>> {
    let matched = routes
        .resolve(path)
        .ok_or_else(|| format!("no page at '{path}'"))?;
    debug!(path = %path, view = %matched.view, "Resolved route");

    match matched.view {
        View::Home => Ok(Target::Home),
        View::AlgorithmDetail => {
            let props = matched.props();
            let id = props
                .get("id")
                .ok_or("algorithm page requires an id")?;
            let id = id
                .parse::<AlgorithmId>()
                .map_err(|e| format!("invalid algorithm id '{id}': {e}"))?;
            Ok(Target::Algorithm(id))
        }
    }
}

/// Fetch an algorithm's image for display. A failure is logged, not fatal.
pub async fn load_image(client: &ApiClient, id: ImageId) -> Option<ContainerImage> {
    match client.get_image(id).await {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(image = %id, error = %e, "Could not load image");
            None
        }
    }
}

/// Navigates between pages using an explicit route table.
pub struct Navigator<'a> {
    routes: &'a RouteTable,
    client: &'a ApiClient,
    page_limit: u32,
}

impl<'a> Navigator<'a> {
    pub fn new(routes: &'a RouteTable, client: &'a ApiClient, page_limit: u32) -> Self {
        Self {
            routes,
            client,
            page_limit,
        }
    }

    /// Resolve `path` and load the data its view needs.
    pub async fn open(&self, path: &str) -> Result<Page, Box<dyn Error>> {
        let page = PageRequest::first(self.page_limit);

        match target(self.routes, path)? {
            Target::Home => {
                let algorithms = self.client.list_algorithms(None, page).await?;
                Ok(Page::Home { algorithms })
            }
            Target::Algorithm(id) => {
                let algorithm = self.client.get_algorithm(id).await?;
                let image = load_image(self.client, algorithm.docker_image).await;
                let tasks = self.client.algorithm_tasks(id, page).await?;
                Ok(Page::AlgorithmDetail {
                    algorithm,
                    image,
                    tasks,
                })
            }
        }
    }

    /// Path of the detail page for `id`.
    pub fn algorithm_path(&self, id: AlgorithmId) -> Result<String, Box<dyn Error>> {
        let id = id.to_string();
        Ok(self.routes.path_for("algorithm", &[("id", id.as_str())])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use oasis_client::stub;

    #[test]
    fn test_target_home() {
        let routes = RouteTable::standard();
        assert_eq!(target(&routes, "/").unwrap(), Target::Home);
    }

    #[test]
    fn test_target_algorithm() {
        let routes = RouteTable::standard();
        assert_eq!(
            target(&routes, "/algorithm/42").unwrap(),
            Target::Algorithm(AlgorithmId::new(42))
        );
    }

    #[test]
    fn test_target_unknown_path() {
        let routes = RouteTable::standard();
        let err = target(&routes, "/datasets/1").unwrap_err();
        assert!(err.to_string().contains("/datasets/1"));
    }

    #[test]
    fn test_target_non_numeric_id() {
        let routes = RouteTable::standard();
        assert!(target(&routes, "/algorithm/latest").is_err());
    }

    #[test]
    fn test_algorithm_path() {
        let routes = RouteTable::standard();
        let client = ApiClient::new("http://localhost:8000/api");
        let nav = Navigator::new(&routes, &client, 10);
        assert_eq!(nav.algorithm_path(AlgorithmId::new(3)).unwrap(), "/algorithm/3");
    }

    #[tokio::test]
    async fn test_open_home_loads_algorithms() {
        let client = stub::spawn().await.unwrap();
        let routes = RouteTable::standard();
        let nav = Navigator::new(&routes, &client, 10);

        match nav.open("/").await.unwrap() {
            Page::Home { algorithms } => {
                let ids: Vec<u64> = algorithms.results.iter().map(|a| a.id().get()).collect();
                assert_eq!(ids, vec![1, 2]);
            }
            Page::AlgorithmDetail { .. } => panic!("expected home page"),
        }
    }

    #[tokio::test]
    async fn test_open_algorithm_loads_detail() {
        let client = stub::spawn().await.unwrap();
        let routes = RouteTable::standard();
        let nav = Navigator::new(&routes, &client, 10);

        let page = nav.open("/algorithm/42?tab=tasks").await.unwrap();
        assert_eq!(serde_json::to_value(&page).unwrap()["view"], "algorithm_detail");

        let Page::AlgorithmDetail {
            algorithm,
            image,
            tasks,
        } = page
        else {
            panic!("expected algorithm page");
        };
        assert_eq!(algorithm.id(), AlgorithmId::new(42));
        assert_eq!(image.map(|i| i.id()), Some(ImageId::new(1)));
        assert_eq!(tasks.len(), 2);
        assert!(tasks.results.iter().all(|t| t.algorithm == AlgorithmId::new(42)));
    }

    #[tokio::test]
    async fn test_open_missing_algorithm() {
        let client = stub::spawn().await.unwrap();
        let routes = RouteTable::standard();
        let nav = Navigator::new(&routes, &client, 10);

        assert!(nav.open("/algorithm/404").await.is_err());
        let err = nav.open("/datasets").await.unwrap_err();
        assert!(err.to_string().contains("/datasets"));
    }

    #[tokio::test]
    async fn test_load_image_tolerates_missing() {
        let client = stub::spawn().await.unwrap();
        assert_eq!(load_image(&client, ImageId::new(404)).await, None);
        let image = load_image(&client, ImageId::new(2)).await.unwrap();
        assert_eq!(image.name, "image-2");
    }
}
