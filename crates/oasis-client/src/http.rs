//! HTTP client for the REST endpoints.

use std::future::Future;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use oasis_core::{
    Algorithm, AlgorithmId, AlgorithmRun, ChecksumFile, ContainerImage, Dataset,
    DatasetFilesUpdate, DatasetId, DatasetTree, ImageId, LogSlice, NewAlgorithm, NewDataset,
    NewImage, PageRequest, Paginated, Task, TaskId,
};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Upper bound on pages fetched by [`ApiClient::collect_all`].
const MAX_PAGES: usize = 1000;

/// HTTP client for the RD-OASIS API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client with default settings.
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        reqwest::Url::parse(&config.base_url).map_err(|e| ClientError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            inner,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the API answers.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let url = self.url("/docker_images/");
        debug!(url = %url, "Checking health");

        let response = self.inner.get(&url).query(&PageRequest::first(1)).send().await?;
        Ok(response.status().is_success())
    }

    // Container images

    pub async fn list_images(
        &self,
        page: PageRequest,
    ) -> Result<Paginated<ContainerImage>, ClientError> {
        self.get_json("/docker_images/", &page, &[]).await
    }

    pub async fn get_image(&self, id: ImageId) -> Result<ContainerImage, ClientError> {
        self.get_json(&format!("/docker_images/{id}/"), &PageRequest::default(), &[])
            .await
    }

    /// Register an image. Exactly one of its sources must be set.
    pub async fn create_image(&self, image: &NewImage) -> Result<ContainerImage, ClientError> {
        image.validate()?;
        self.send_json(Method::POST, "/docker_images/", image).await
    }

    /// Replace every writable field of image `id`.
    pub async fn update_image(
        &self,
        id: ImageId,
        image: &NewImage,
    ) -> Result<ContainerImage, ClientError> {
        image.validate()?;
        self.send_json(Method::PUT, &format!("/docker_images/{id}/"), image)
            .await
    }

    pub async fn delete_image(&self, id: ImageId) -> Result<(), ClientError> {
        self.delete(&format!("/docker_images/{id}/")).await
    }

    // Algorithms

    /// List algorithms, optionally only those using `image`.
    pub async fn list_algorithms(
        &self,
        image: Option<ImageId>,
        page: PageRequest,
    ) -> Result<Paginated<Algorithm>, ClientError> {
        let filter: Vec<_> = image
            .map(|id| ("docker_image__pk", id.to_string()))
            .into_iter()
            .collect();
        self.get_json("/algorithms/", &page, &filter).await
    }

    pub async fn get_algorithm(&self, id: AlgorithmId) -> Result<Algorithm, ClientError> {
        self.get_json(&format!("/algorithms/{id}/"), &PageRequest::default(), &[])
            .await
    }

    pub async fn create_algorithm(&self, alg: &NewAlgorithm) -> Result<Algorithm, ClientError> {
        self.send_json(Method::POST, "/algorithms/", alg).await
    }

    /// Replace every writable field of algorithm `id`.
    pub async fn update_algorithm(
        &self,
        id: AlgorithmId,
        alg: &NewAlgorithm,
    ) -> Result<Algorithm, ClientError> {
        self.send_json(Method::PUT, &format!("/algorithms/{id}/"), alg)
            .await
    }

    pub async fn delete_algorithm(&self, id: AlgorithmId) -> Result<(), ClientError> {
        self.delete(&format!("/algorithms/{id}/")).await
    }

    /// Start a task running `id` on a dataset.
    pub async fn run_algorithm(
        &self,
        id: AlgorithmId,
        run: &AlgorithmRun,
    ) -> Result<Task, ClientError> {
        self.send_json(Method::POST, &format!("/algorithms/{id}/run/"), run)
            .await
    }

    /// Tasks that executed algorithm `id`.
    pub async fn algorithm_tasks(
        &self,
        id: AlgorithmId,
        page: PageRequest,
    ) -> Result<Paginated<Task>, ClientError> {
        self.get_json(&format!("/algorithms/{id}/tasks/"), &page, &[])
            .await
    }

    // Tasks

    /// List tasks, optionally only those of `algorithm`.
    pub async fn list_tasks(
        &self,
        algorithm: Option<AlgorithmId>,
        page: PageRequest,
    ) -> Result<Paginated<Task>, ClientError> {
        let filter: Vec<_> = algorithm
            .map(|id| ("algorithm__pk", id.to_string()))
            .into_iter()
            .collect();
        self.get_json("/algorithm_tasks/", &page, &filter).await
    }

    pub async fn get_task(&self, id: TaskId) -> Result<Task, ClientError> {
        self.get_json(&format!("/algorithm_tasks/{id}/"), &PageRequest::default(), &[])
            .await
    }

    /// Plain-text output log of a task.
    pub async fn task_logs(&self, id: TaskId, slice: LogSlice) -> Result<String, ClientError> {
        let path = format!("/algorithm_tasks/{id}/logs/");
        let url = self.url(&path);
        debug!(url = %url, ?slice, "GET logs");

        let response = self.inner.get(&url).query(&slice.query()).send().await?;
        let response = check_status(response, &path).await?;
        Ok(response.text().await?)
    }

    /// Files of the task's input dataset.
    pub async fn task_input(
        &self,
        id: TaskId,
        page: PageRequest,
    ) -> Result<Paginated<ChecksumFile>, ClientError> {
        self.get_json(&format!("/algorithm_tasks/{id}/input/"), &page, &[])
            .await
    }

    /// Files of the task's output dataset.
    pub async fn task_output(
        &self,
        id: TaskId,
        page: PageRequest,
    ) -> Result<Paginated<ChecksumFile>, ClientError> {
        self.get_json(&format!("/algorithm_tasks/{id}/output/"), &page, &[])
            .await
    }

    // Datasets

    /// List datasets. Output datasets of tasks are left out unless requested.
    pub async fn list_datasets(
        &self,
        include_output: bool,
        page: PageRequest,
    ) -> Result<Paginated<Dataset>, ClientError> {
        let filter = [("include_output_datasets", include_output.to_string())];
        self.get_json("/datasets/", &page, &filter).await
    }

    pub async fn get_dataset(&self, id: DatasetId) -> Result<Dataset, ClientError> {
        self.get_json(&format!("/datasets/{id}/"), &PageRequest::default(), &[])
            .await
    }

    pub async fn create_dataset(&self, dataset: &NewDataset) -> Result<Dataset, ClientError> {
        self.send_json(Method::POST, "/datasets/", dataset).await
    }

    /// Replace every writable field of dataset `id`.
    pub async fn update_dataset(
        &self,
        id: DatasetId,
        dataset: &NewDataset,
    ) -> Result<Dataset, ClientError> {
        self.send_json(Method::PUT, &format!("/datasets/{id}/"), dataset)
            .await
    }

    pub async fn delete_dataset(&self, id: DatasetId) -> Result<(), ClientError> {
        self.delete(&format!("/datasets/{id}/")).await
    }

    pub async fn dataset_files(
        &self,
        id: DatasetId,
        page: PageRequest,
    ) -> Result<Paginated<ChecksumFile>, ClientError> {
        self.get_json(&format!("/datasets/{id}/files/"), &page, &[])
            .await
    }

    /// Insert files into and delete files from a dataset.
    pub async fn update_dataset_files(
        &self,
        id: DatasetId,
        update: &DatasetFilesUpdate,
    ) -> Result<Dataset, ClientError> {
        self.send_json(Method::PUT, &format!("/datasets/{id}/files/"), update)
            .await
    }

    /// One level of the dataset's file hierarchy below `prefix`.
    ///
    /// An empty prefix lists the top level.
    pub async fn dataset_tree(&self, id: DatasetId, prefix: &str) -> Result<DatasetTree, ClientError> {
        let filter: Vec<_> = Some(prefix)
            .filter(|p| !p.is_empty())
            .map(|p| ("path_prefix", p.to_string()))
            .into_iter()
            .collect();
        self.get_json(&format!("/datasets/{id}/tree/"), &PageRequest::default(), &filter)
            .await
    }

    /// Fetch every page of a list endpoint, following `next` links.
    ///
    /// ```ignore
    /// let tasks = client
    ///     .collect_all(PageRequest::first(100), |page| client.list_tasks(None, page))
    ///     .await?;
    /// ```
    pub async fn collect_all<T, F, Fut>(
        &self,
        first: PageRequest,
        mut fetch: F,
    ) -> Result<Vec<T>, ClientError>
    where
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = Result<Paginated<T>, ClientError>>,
    {
        let mut records = Vec::new();
        let mut request = first;

        for _ in 0..MAX_PAGES {
            let page = fetch(request).await?;
            let next = page.next_page();
            records.extend(page.results);

            match next {
                Some(next) if next.offset > request.offset => request = next,
                Some(_) => {
                    warn!(offset = ?request.offset, "Next page link does not advance, stopping");
                    return Ok(records);
                }
                None => return Ok(records),
            }
        }

        warn!(pages = MAX_PAGES, "Page limit reached, results truncated");
        Ok(records)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET JSON from an endpoint.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        page: &PageRequest,
        filter: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!(url = %url, ?page, "GET request");

        let request = self.inner.get(&url).query(page).query(filter);
        self.execute(request, path).await
    }

    /// Send a JSON body and decode the JSON response.
    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!(url = %url, method = %method, "JSON request");

        let request = self.inner.request(method, &url).json(body);
        self.execute(request, path).await
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = self.url(path);
        debug!(url = %url, "DELETE request");

        let response = self.inner.delete(&url).send().await?;
        check_status(response, path).await?;
        Ok(())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, ClientError> {
        let response = check_status(request.send().await?, path).await?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body)
            .map_err(|e| ClientError::Serialization(format!("{path}: {e}")))
    }
}

async fn check_status(response: Response, path: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(path.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        path: path.to_string(),
        body,
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    use oasis_core::{ChecksumFileId, TaskStatus};

    use crate::stub::{self, NEW_ID};

    async fn client() -> ApiClient {
        stub::spawn().await.unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/api/");
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/algorithms/"), "http://localhost:8000/api/algorithms/");
    }

    #[test]
    fn test_from_config_rejects_bad_url() {
        let config = ClientConfig::with_base_url("not a url");
        assert!(matches!(
            ApiClient::from_config(&config),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_health() {
        let client = client().await;
        assert!(client.health().await.unwrap());

        let missing = ApiClient::new(&format!("{}/nowhere", client.base_url()));
        assert!(!missing.health().await.unwrap());
    }

    #[tokio::test]
    async fn test_list_images_sends_limit() {
        let client = client().await;
        let page = client.list_images(PageRequest::first(2)).await.unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.len(), 2);
        assert_eq!(
            page.next_page(),
            Some(PageRequest {
                limit: Some(2),
                offset: Some(2)
            })
        );
    }

    #[tokio::test]
    async fn test_get_image() {
        let client = client().await;
        let image = client.get_image(ImageId::new(3)).await.unwrap();
        assert_eq!(image.id(), ImageId::new(3));
        assert_eq!(image.name, "image-3");
        assert!(client.get_image(ImageId::new(404)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_image() {
        let client = client().await;
        let image = client
            .create_image(&NewImage::registry("gdal", "osgeo/gdal:latest"))
            .await
            .unwrap();
        assert_eq!(image.id(), ImageId::new(NEW_ID));
        assert_eq!(image.image_id.as_deref(), Some("osgeo/gdal:latest"));
        assert_eq!(image.image_file, None);
    }

    #[tokio::test]
    async fn test_create_image_rejects_two_sources_locally() {
        let client = client().await;
        let mut body = NewImage::registry("gdal", "osgeo/gdal:latest");
        body.image_file = Some(ChecksumFileId::new(4));
        let err = client.create_image(&body).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_image() {
        let client = client().await;
        let image = client
            .update_image(ImageId::new(5), &NewImage::file("tarball", ChecksumFileId::new(8)))
            .await
            .unwrap();
        assert_eq!(image.id(), ImageId::new(5));
        assert_eq!(image.image_file, Some(ChecksumFileId::new(8)));

        client.delete_image(ImageId::new(5)).await.unwrap();
        assert!(client.delete_image(ImageId::new(404)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_get_algorithm() {
        let client = client().await;
        let alg = client.get_algorithm(AlgorithmId::new(42)).await.unwrap();
        assert_eq!(alg.id(), AlgorithmId::new(42));
        assert_eq!(alg.name, "alg-42");
    }

    #[tokio::test]
    async fn test_not_found() {
        let client = client().await;
        let err = client.get_algorithm(AlgorithmId::new(404)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_algorithms_by_image() {
        let client = client().await;
        let page = client
            .list_algorithms(Some(ImageId::new(6)), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert!(page.results.iter().all(|a| a.docker_image == ImageId::new(6)));
    }

    #[tokio::test]
    async fn test_create_update_delete_algorithm() {
        let client = client().await;
        let mut body = NewAlgorithm::new("threshold", "python run.py", ImageId::new(3));
        body.environment.insert("BAND".to_string(), "red".to_string());

        let alg = client.create_algorithm(&body).await.unwrap();
        assert_eq!(alg.id(), AlgorithmId::new(NEW_ID));
        assert_eq!(alg.environment.get("BAND").map(String::as_str), Some("red"));

        body.gpu = true;
        let alg = client.update_algorithm(AlgorithmId::new(12), &body).await.unwrap();
        assert_eq!(alg.id(), AlgorithmId::new(12));
        assert!(alg.gpu);

        client.delete_algorithm(AlgorithmId::new(12)).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_algorithm_posts_dataset() {
        let client = client().await;
        let run = AlgorithmRun {
            input_dataset: DatasetId::new(5),
        };
        let task = client.run_algorithm(AlgorithmId::new(7), &run).await.unwrap();
        assert_eq!(task.id(), TaskId::new(500));
        assert_eq!(task.algorithm, AlgorithmId::new(7));
        assert_eq!(task.status, TaskStatus::Queued);
    }

    #[tokio::test]
    async fn test_algorithm_tasks() {
        let client = client().await;
        let page = client
            .algorithm_tasks(AlgorithmId::new(42), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert!(page.results.iter().all(|t| t.algorithm == AlgorithmId::new(42)));
    }

    #[tokio::test]
    async fn test_list_tasks_with_filter() {
        let client = client().await;
        let page = client
            .list_tasks(Some(AlgorithmId::new(4)), PageRequest::first(2))
            .await
            .unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.len(), 2);
        assert!(page.results.iter().all(|t| t.algorithm == AlgorithmId::new(4)));
        assert_eq!(page.next_page().unwrap().offset, Some(2));
    }

    #[tokio::test]
    async fn test_collect_all_follows_next_links() {
        let client = client().await;
        let tasks = client
            .collect_all(PageRequest::first(2), |page| client.list_tasks(None, page))
            .await
            .unwrap();
        let ids: Vec<u64> = tasks.iter().map(|t| t.id().get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_task_logs_slices() {
        let client = client().await;
        let id = TaskId::new(1);
        assert_eq!(client.task_logs(id, LogSlice::Tail(5)).await.unwrap(), "last 5 lines");
        assert_eq!(client.task_logs(id, LogSlice::Head(3)).await.unwrap(), "first 3 lines");
        assert_eq!(client.task_logs(id, LogSlice::All).await.unwrap(), "full log");
    }

    #[tokio::test]
    async fn test_task_input_and_output() {
        let client = client().await;
        let input = client.task_input(TaskId::new(3), PageRequest::default()).await.unwrap();
        assert_eq!(input.results[0].name, "input/3.tif");

        let output = client.task_output(TaskId::new(3), PageRequest::default()).await.unwrap();
        assert_eq!(output.results[0].name, "output/3.tif");
    }

    #[tokio::test]
    async fn test_list_datasets_include_output() {
        let client = client().await;
        let page = client.list_datasets(false, PageRequest::default()).await.unwrap();
        assert_eq!(page.count, 1);

        let page = client.list_datasets(true, PageRequest::default()).await.unwrap();
        let names: Vec<&str> = page.results.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["inputs", "task-output"]);
    }

    #[tokio::test]
    async fn test_get_dataset_and_files() {
        let client = client().await;
        let dataset = client.get_dataset(DatasetId::new(4)).await.unwrap();
        assert_eq!(dataset.id(), DatasetId::new(4));
        assert_eq!(dataset.size, Some(2048));

        let files = client
            .dataset_files(DatasetId::new(4), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files.results[1].basename(), "c.txt");
    }

    #[tokio::test]
    async fn test_create_update_delete_dataset() {
        let client = client().await;
        let mut body = NewDataset::new("survey");
        body.files = vec![ChecksumFileId::new(1)];

        let dataset = client.create_dataset(&body).await.unwrap();
        assert_eq!(dataset.id(), DatasetId::new(NEW_ID));
        assert_eq!(dataset.size, None);

        body.description = Some("2021 flights".to_string());
        let dataset = client.update_dataset(DatasetId::new(3), &body).await.unwrap();
        assert_eq!(dataset.description.as_deref(), Some("2021 flights"));

        client.delete_dataset(DatasetId::new(3)).await.unwrap();
        assert!(client.delete_dataset(DatasetId::new(404)).await.is_err());
    }

    #[tokio::test]
    async fn test_update_dataset_files() {
        let client = client().await;
        let update = DatasetFilesUpdate {
            insert: vec![ChecksumFileId::new(4), ChecksumFileId::new(6)],
            delete: Vec::new(),
        };
        let dataset = client
            .update_dataset_files(DatasetId::new(2), &update)
            .await
            .unwrap();
        assert_eq!(dataset.id(), DatasetId::new(2));
        assert_eq!(dataset.files, vec![ChecksumFileId::new(4), ChecksumFileId::new(6)]);
    }

    #[tokio::test]
    async fn test_dataset_tree() {
        let client = client().await;
        let top = client.dataset_tree(DatasetId::new(1), "").await.unwrap();
        assert_eq!(top.folders["a"].num_files, 3);
        assert!(top.files.contains_key("h.txt"));

        let nested = client.dataset_tree(DatasetId::new(1), "a").await.unwrap();
        assert!(nested.folders.is_empty());
        assert_eq!(nested.files["f.txt"].name, "a/f.txt");
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let client = client().await;
        let err = client.get_dataset(DatasetId::new(500)).await.unwrap_err();
        match err {
            ClientError::Status { status, path, body } => {
                assert_eq!(status, 500);
                assert_eq!(path, "/datasets/500/");
                assert_eq!(body, "boom");
            }
            other => panic!("Expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_record_is_serialization_error() {
        let client = client().await;
        let err = client.get_task(TaskId::new(9)).await.unwrap_err();
        assert!(matches!(err, ClientError::Serialization(_)));
    }
}
