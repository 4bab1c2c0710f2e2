//! Text output for records and pages.

use chrono::{DateTime, Utc};
use serde::Serialize;

use oasis_core::{
    Algorithm, ChecksumFile, ContainerImage, Dataset, DatasetTree, ImageSource, Paginated, Task,
};

use crate::navigate::Page;

/// Print any record as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn print_page_footer<T>(page: &Paginated<T>) {
    if page.has_next() {
        println!("  ... {} of {} shown", page.len(), page.count);
    }
}

pub fn print_images(page: &Paginated<ContainerImage>) {
    println!("Images ({}):", page.count);
    println!("{:<6}  {:<24}  {}", "ID", "NAME", "SOURCE");
    println!("{}", "-".repeat(80));

    for image in &page.results {
        println!("{:<6}  {:<24}  {}", image.id(), image.name, image_source(image));
    }
    print_page_footer(page);
}

pub fn print_image(image: &ContainerImage) {
    println!("  ID:         {}", image.id());
    println!("  Name:       {}", image.name);
    println!("  Source:     {}", image_source(image));
    println!("  Created:    {}", format_timestamp(&image.meta.created));
}

fn image_source(image: &ContainerImage) -> String {
    match image.source() {
        Ok(ImageSource::Registry(reference)) => reference.to_string(),
        Ok(ImageSource::File(file)) => format!("file #{file}"),
        Err(_) => "invalid".to_string(),
    }
}

pub fn print_algorithms(page: &Paginated<Algorithm>) {
    println!("Algorithms ({}):", page.count);
    println!("{:<6}  {:<24}  {:<6}  {:<4}  {}", "ID", "NAME", "IMAGE", "GPU", "COMMAND");
    println!("{}", "-".repeat(80));

    for alg in &page.results {
        let gpu = if alg.gpu { "yes" } else { "no" };
        println!(
            "{:<6}  {:<24}  {:<6}  {:<4}  {}",
            alg.id(),
            alg.name,
            alg.docker_image,
            gpu,
            alg.command
        );
    }
    print_page_footer(page);
}

pub fn print_algorithm(alg: &Algorithm, image: Option<&ContainerImage>) {
    println!("  ID:         {}", alg.id());
    println!("  Name:       {}", alg.name);
    println!("  Command:    {}", alg.command);
    if let Some(entrypoint) = &alg.entrypoint {
        println!("  Entrypoint: {}", entrypoint);
    }
    match image {
        Some(image) => println!("  Image:      {} ({})", image.name, image_source(image)),
        None => println!("  Image:      #{}", alg.docker_image),
    }
    println!("  GPU:        {}", alg.gpu);
    println!("  Created:    {}", format_timestamp(&alg.meta.created));
    println!("  Modified:   {}", format_timestamp(&alg.meta.modified));

    if !alg.environment.is_empty() {
        println!("  Environment:");
        for (key, value) in &alg.environment {
            println!("    {}={}", key, value);
        }
    }

    if !alg.input_dataset.is_empty() {
        let inputs: Vec<String> = alg.input_dataset.iter().map(|d| d.to_string()).collect();
        println!("  Inputs:     {}", inputs.join(", "));
    }
}

pub fn print_tasks(page: &Paginated<Task>) {
    println!("Tasks ({}):", page.count);
    println!("{:<6}  {:<10}  {:<10}  {}", "ID", "STATUS", "ALGORITHM", "CREATED");
    println!("{}", "-".repeat(80));

    for task in &page.results {
        println!(
            "{:<6}  {:<10}  {:<10}  {}",
            task.id(),
            task.status,
            task.algorithm,
            format_timestamp(&task.meta.created)
        );
    }
    print_page_footer(page);
}

pub fn print_task(task: &Task) {
    println!("  ID:         {}", task.id());
    println!("  Algorithm:  {}", task.algorithm);
    println!("  Status:     {}", task.status);
    println!("  Created:    {}", format_timestamp(&task.meta.created));
    println!("  Modified:   {}", format_timestamp(&task.meta.modified));
}

pub fn print_datasets(page: &Paginated<Dataset>) {
    println!("Datasets ({}):", page.count);
    println!("{:<6}  {:<24}  {:<6}  {}", "ID", "NAME", "FILES", "SIZE");
    println!("{}", "-".repeat(80));

    for dataset in &page.results {
        let size = dataset
            .size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6}  {:<24}  {:<6}  {}",
            dataset.id(),
            dataset.name,
            dataset.files.len(),
            size
        );
    }
    print_page_footer(page);
}

pub fn print_dataset(dataset: &Dataset) {
    println!("  ID:         {}", dataset.id());
    println!("  Name:       {}", dataset.name);
    if let Some(description) = &dataset.description {
        println!("  About:      {}", description);
    }
    if let Some(size) = dataset.size {
        println!("  Size:       {} bytes", size);
    }
    println!("  Files:      {}", dataset.files.len());
    println!("  Created:    {}", format_timestamp(&dataset.meta.created));
}

pub fn print_files(page: &Paginated<ChecksumFile>) {
    println!("Files ({}):", page.count);
    println!("{:<6}  {:<8}  {:<4}  {:<32}  {}", "ID", "STATUS", "TYPE", "CHECKSUM", "NAME");
    println!("{}", "-".repeat(80));

    for file in &page.results {
        println!(
            "{:<6}  {:<8}  {:<4}  {:<32}  {}",
            file.id(),
            file.status,
            file.file_type,
            file.checksum,
            file.name
        );
        if let Some(reason) = &file.failure_reason {
            println!("        failed: {}", reason);
        }
    }
    print_page_footer(page);
}

/// Print one level of a dataset tree, folders first.
pub fn print_tree(prefix: &str, tree: &DatasetTree) {
    let shown = prefix.trim_matches('/');
    println!("/{shown}");
    if tree.is_empty() {
        println!("  (empty)");
        return;
    }

    for (name, folder) in &tree.folders {
        println!(
            "  {:<32}  {:>6} files  {:>12} bytes  --prefix {}",
            format!("{name}/"),
            folder.num_files,
            folder.known_size,
            DatasetTree::child_prefix(prefix, name)
        );
        if folder.num_url_files > 0 {
            println!("        {} of unknown size", folder.num_url_files);
        }
    }
    for (name, file) in &tree.files {
        println!("  {:<32}  #{:<5}  {}", name, file.id(), file.status);
    }
}

/// Render a loaded page. `detail_path` gives the page path of an algorithm.
pub fn print_page(page: &Page, detail_path: impl Fn(&Algorithm) -> Option<String>) {
    match page {
        Page::Home { algorithms } => {
            println!("Algorithms ({}):", algorithms.count);
            println!("{}", "-".repeat(80));
            for alg in &algorithms.results {
                let path = detail_path(alg).unwrap_or_default();
                println!("  {:<32}  {}", alg.name, path);
            }
            print_page_footer(algorithms);
        }
        Page::AlgorithmDetail {
            algorithm,
            image,
            tasks,
        } => {
            println!("Algorithm:");
            print_algorithm(algorithm, image.as_ref());
            println!();
            print_tasks(tasks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 5).unwrap();
        assert_eq!(format_timestamp(&at), "2021-06-01 12:30:05");
    }
}
