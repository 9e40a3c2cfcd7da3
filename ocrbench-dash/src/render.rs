//! Terminal and JSON renderers
//!
//! Best values in every table are suffixed with `*`; the sorted column
//! header carries an arrow.

use crate::aggregate::{self, best_scores, rank, BestScores, Metric, MetricRow, SortDirection, SortState};
use crate::dashboard::{DashboardContext, DetailScreen};
use crate::detail::{filter_by_model, image_path, model_names, sort_images, AccuracyBand, ImageSort};
use crate::diff::{generate_diff, render_inline};
use ocrbench_common::{ImageResult, ModelLinks};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Left-aligned plain-text table
struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}", width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", line(&self.headers));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(out, "{}", line(&rule));
        for row in &self.rows {
            let _ = writeln!(out, "{}", line(row));
        }
        out
    }
}

fn metric_header(metric: Metric, sort: SortState) -> String {
    if metric != sort.column {
        return metric.label().to_string();
    }
    let arrow = match sort.direction {
        SortDirection::Asc => "▲",
        SortDirection::Desc => "▼",
    };
    format!("{} {arrow}", metric.label())
}

fn metric_cell(value: f64, metric: Metric, best: Option<&BestScores>) -> String {
    let marker = match best {
        Some(best) if best.is_best(metric, value) => "*",
        _ => "",
    };
    format!("{value:.2}{marker}")
}

fn metric_table<R: MetricRow>(
    rows: &BTreeMap<String, R>,
    sort: SortState,
    links: &ModelLinks,
    extra_headers: &[&str],
    extra_cells: impl Fn(&R) -> Vec<String>,
) -> String {
    let best = best_scores(rows.values());

    let mut headers = vec!["Rank".to_string(), "Model".to_string()];
    headers.extend(Metric::ALL.iter().map(|m| metric_header(*m, sort)));
    headers.extend(extra_headers.iter().map(|h| h.to_string()));
    let show_links = rows.keys().any(|model| links.contains_key(model));
    if show_links {
        headers.push("Link".to_string());
    }

    let mut table = TextTable::new(headers);
    for (position, (model, row)) in rank(rows, sort).into_iter().enumerate() {
        let mut cells = vec![(position + 1).to_string(), model.to_string()];
        cells.extend(
            Metric::ALL
                .iter()
                .map(|m| metric_cell(row.metric(*m), *m, best.as_ref())),
        );
        cells.extend(extra_cells(row));
        if show_links {
            cells.push(links.get(model).cloned().unwrap_or_default());
        }
        table.push(cells);
    }
    table.render()
}

/// Full dashboard: header, overall leaderboard, then every subcategory table
pub fn render_dashboard(ctx: &DashboardContext, sort: SortState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", render_summary(ctx));
    let _ = writeln!(out, "{}", render_leaderboard(ctx, sort));

    for category in ctx.category_order() {
        let _ = writeln!(out, "== {category} ==");
        let subcategories = ctx.subcategory_order(category);
        if subcategories.is_empty() {
            let _ = writeln!(out, "(no results loaded)\n");
            continue;
        }
        for subcategory in subcategories {
            let Some(result) = ctx.aggregated.subcategory(category, subcategory) else {
                continue;
            };
            let _ = writeln!(
                out,
                "-- {subcategory} ({} images) --",
                ctx.image_count(category, subcategory)
            );
            if result.is_empty() {
                let _ = writeln!(out, "(no valid model entries)\n");
                continue;
            }
            let _ = writeln!(
                out,
                "{}",
                metric_table(result, sort, &ctx.model_links, &[], |_| Vec::new())
            );
        }
    }
    out
}

/// Header lines: generation time, dataset size and load problems
pub fn render_summary(ctx: &DashboardContext) -> String {
    let mut out = String::new();
    let updated = ctx
        .manifest
        .generated_at()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let _ = writeln!(out, "OCR Benchmark Results");
    let _ = writeln!(
        out,
        "Last updated: {updated} | Total images: {} | Models: {}",
        ctx.total_images(),
        ctx.model_averages().len()
    );
    if !ctx.failures.is_empty() {
        let _ = writeln!(
            out,
            "Warning: {} of {} result files failed to load",
            ctx.failures.len(),
            ctx.manifest.files.len()
        );
    }
    if !ctx.rejected.is_empty() {
        let _ = writeln!(out, "Warning: {} model entries were invalid and skipped", ctx.rejected.len());
    }
    out
}

/// Overall leaderboard across every loaded subcategory
pub fn render_leaderboard(ctx: &DashboardContext, sort: SortState) -> String {
    let averages = ctx.model_averages();
    let mut out = String::from("== Overall (weighted by image count) ==\n");
    if averages.is_empty() {
        out.push_str("(no models)\n");
        return out;
    }
    out.push_str(&metric_table(
        &averages,
        sort,
        &ctx.model_links,
        &["Images", "Benchmarks"],
        |avg| vec![avg.total_images.to_string(), avg.benchmark_count.to_string()],
    ));
    out
}

fn ranked_json<R: MetricRow>(rows: &BTreeMap<String, R>, sort: SortState, links: &ModelLinks) -> Vec<Value> {
    let best = best_scores(rows.values());
    rank(rows, sort)
        .into_iter()
        .enumerate()
        .map(|(position, (model, row))| {
            let leading: Vec<Metric> = Metric::ALL
                .into_iter()
                .filter(|m| best.map_or(false, |b| b.is_best(*m, row.metric(*m))))
                .collect();
            json!({
                "rank": position + 1,
                "model": model,
                "accuracy": row.metric(Metric::Accuracy),
                "cer": row.metric(Metric::Cer),
                "wer": row.metric(Metric::Wer),
                "time": row.metric(Metric::Time),
                "best": leading,
                "link": links.get(model),
            })
        })
        .collect()
}

/// Machine-readable dashboard
pub fn dashboard_json(ctx: &DashboardContext, sort: SortState) -> Value {
    let averages = ctx.model_averages();
    let mut overall = ranked_json(&averages, sort, &ctx.model_links);
    for entry in &mut overall {
        if let Some(avg) = entry["model"].as_str().and_then(|m| averages.get(m)) {
            entry["totalImages"] = json!(avg.total_images);
            entry["benchmarkCount"] = json!(avg.benchmark_count);
        }
    }

    let categories: Vec<Value> = ctx
        .category_order()
        .into_iter()
        .map(|category| {
            let subcategories: Vec<Value> = ctx
                .subcategory_order(category)
                .into_iter()
                .filter_map(|subcategory| {
                    let result = ctx.aggregated.subcategory(category, subcategory)?;
                    Some(json!({
                        "name": subcategory,
                        "imageCount": ctx.image_count(category, subcategory),
                        "results": ranked_json(result, sort, &ctx.model_links),
                    }))
                })
                .collect();
            json!({ "name": category, "subcategories": subcategories })
        })
        .collect();

    json!({
        "generated": ctx.manifest.generated,
        "totalImages": aggregate::total_images(&ctx.manifest, &ctx.aggregated),
        "sort": sort,
        "overall": overall,
        "categories": categories,
        "failures": ctx.failures,
        "rejected": ctx.rejected,
    })
}

/// Images of one subcategory after sorting and model filtering
pub fn detail_images(screen: &DetailScreen, sort: ImageSort, model: Option<&str>) -> Vec<ImageResult> {
    let sorted = sort_images(screen.batch.images(), sort);
    filter_by_model(sorted, model)
}

/// Detail view: one block per image, models best first
pub fn render_details(
    screen: &DetailScreen,
    sort: ImageSort,
    model: Option<&str>,
    show_diff: bool,
    links: &ModelLinks,
) -> String {
    let images = detail_images(screen, sort, model);
    let models = model_names(screen.batch.images());
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} / {}: {} images, {} models (sorted by {sort})",
        screen.category,
        screen.subcategory,
        screen.batch.data.len(),
        models.len()
    );
    let _ = writeln!(out, "Models: {}", models.join(", "));
    if !screen.batch.failed.is_empty() {
        let attempted = screen.batch.failed.len() + screen.batch.successful.len();
        let _ = writeln!(
            out,
            "Warning: {} of {attempted} files failed to load",
            screen.batch.failed.len()
        );
    }
    if let Some(name) = model {
        let _ = writeln!(out, "Showing model: {name} ({} images)", images.len());
    }
    let _ = writeln!(out);

    for image in &images {
        let average = image.average_accuracy();
        let _ = writeln!(
            out,
            "{}  avg {average:.2}% ({})  {}",
            image.filename,
            AccuracyBand::for_accuracy(average),
            image_path(&screen.category, &screen.subcategory, image)
        );
        let ground_truth = image.ground_truth().unwrap_or_default();
        let _ = writeln!(out, "  Ground truth: {ground_truth}");

        for (name, result) in image.models_by_accuracy() {
            let link = links
                .get(name)
                .map(|url| format!(" <{url}>"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {name}{link}  {:.2}% ({})  WER {:.2}  CER {:.2}  {:.2}s",
                result.accuracy,
                AccuracyBand::for_accuracy(result.accuracy),
                result.wer,
                result.cer,
                result.time
            );
            let _ = writeln!(out, "    {}", result.response);
            if show_diff {
                let parts = generate_diff(&result.ground_truth, &result.response);
                let _ = writeln!(out, "    diff: {}", render_inline(&parts));
            }
        }
        let _ = writeln!(out);
    }
    out
}

/// Machine-readable detail view
pub fn details_json(screen: &DetailScreen, sort: ImageSort, model: Option<&str>, show_diff: bool) -> Value {
    let images: Vec<Value> = detail_images(screen, sort, model)
        .iter()
        .map(|image| {
            let average = image.average_accuracy();
            let models: Vec<Value> = image
                .models_by_accuracy()
                .into_iter()
                .map(|(name, result)| {
                    let mut entry = json!({
                        "model": name,
                        "response": result.response,
                        "wer": result.wer,
                        "cer": result.cer,
                        "accuracy": result.accuracy,
                        "time": result.time,
                        "band": AccuracyBand::for_accuracy(result.accuracy),
                    });
                    if show_diff {
                        entry["diff"] = json!(generate_diff(&result.ground_truth, &result.response));
                    }
                    entry
                })
                .collect();

            json!({
                "filename": image.filename,
                "filePath": image.file_path,
                "imagePath": image_path(&screen.category, &screen.subcategory, image),
                "groundTruth": image.ground_truth(),
                "averageAccuracy": average,
                "band": AccuracyBand::for_accuracy(average),
                "models": models,
            })
        })
        .collect();

    json!({
        "category": screen.category,
        "subcategory": screen.subcategory,
        "sort": sort,
        "models": model_names(screen.batch.images()),
        "images": images,
        "failed": screen.batch.failed,
        "rejected": screen.batch.rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::{DetailBatch, LoadedFile};
    use crate::error::{EntryRejection, FileFailure};
    use ocrbench_common::{AggregatedData, ImageModelResult, MetricSummary, SubcategoryResult};
    use std::sync::Arc;

    fn summary(accuracy: f64, wer: f64) -> MetricSummary {
        MetricSummary {
            avg_wer: wer,
            avg_cer: 1.0,
            avg_accuracy: accuracy,
            avg_time: 0.5,
            images: 4,
        }
    }

    #[test]
    fn test_metric_table_marks_best_and_sort_arrow() {
        let mut rows = SubcategoryResult::new();
        rows.insert("alpha".to_string(), summary(91.0, 9.0));
        rows.insert("beta".to_string(), summary(97.0, 3.0));

        let text = metric_table(&rows, SortState::default(), &ModelLinks::new(), &[], |_| Vec::new());
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].contains("Accuracy (%) ▼"));
        assert!(lines[2].starts_with("1     beta"));
        assert!(lines[2].contains("97.00*"));
        assert!(lines[2].contains("3.00*"));
        assert!(lines[3].contains("91.00 "));
        assert!(!text.contains("Link"));
    }

    #[test]
    fn test_metric_table_link_column() {
        let mut rows = SubcategoryResult::new();
        rows.insert("alpha".to_string(), summary(91.0, 9.0));
        let mut links = ModelLinks::new();
        links.insert("alpha".to_string(), "https://example.org/alpha".to_string());

        let text = metric_table(&rows, SortState::default(), &links, &[], |_| Vec::new());
        assert!(text.contains("Link"));
        assert!(text.contains("https://example.org/alpha"));
    }

    #[test]
    fn test_ranked_json_best_flags() {
        let mut rows = SubcategoryResult::new();
        rows.insert("alpha".to_string(), summary(91.0, 3.0));
        rows.insert("beta".to_string(), summary(97.0, 9.0));

        let ranked = ranked_json(&rows, SortState::default(), &ModelLinks::new());
        assert_eq!(ranked[0]["model"], "beta");
        assert_eq!(ranked[0]["rank"], 1);
        let beta_best: Vec<&str> = ranked[0]["best"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(beta_best, vec!["accuracy", "cer", "time"]);
        assert_eq!(ranked[1]["best"], json!(["cer", "wer", "time"]));
        assert!(ranked[1]["link"].is_null());
    }

    fn context() -> DashboardContext {
        let manifest = serde_json::from_value(json!({
            "generated": "2025-03-01T12:30:00Z",
            "files": ["Latin/book-a.json", "Latin/book-b.json", "Greek/codex.json"],
            "structure": {
                "Latin": {
                    "book-a": { "image_count": 10 },
                    "book-b": { "image_count": 30 }
                },
                "Greek": {
                    "codex": { "image_count": 5 }
                }
            }
        }))
        .unwrap();

        let mut aggregated = AggregatedData::new();
        let mut book_a = SubcategoryResult::new();
        book_a.insert("alpha".to_string(), summary(91.0, 9.0));
        book_a.insert("beta".to_string(), summary(97.0, 3.0));
        aggregated.insert("Latin", "book-a", book_a);
        let mut book_b = SubcategoryResult::new();
        book_b.insert("alpha".to_string(), summary(93.0, 5.0));
        aggregated.insert("Latin", "book-b", book_b);

        DashboardContext {
            manifest,
            aggregated,
            model_links: ModelLinks::new(),
            failures: vec![FileFailure {
                file: "Greek/codex.json".to_string(),
                reason: "HTTP 404".to_string(),
            }],
            rejected: vec![EntryRejection {
                file: "Latin/book-b.json".to_string(),
                model: "gamma".to_string(),
                reason: "avg_accuracy above 100".to_string(),
            }],
        }
    }

    fn model_result(ground_truth: &str, response: &str, accuracy: f64) -> ImageModelResult {
        ImageModelResult {
            ground_truth: ground_truth.to_string(),
            response: response.to_string(),
            wer: 100.0 - accuracy,
            cer: (100.0 - accuracy) / 4.0,
            accuracy,
            time: 1.25,
        }
    }

    fn detail_screen() -> DetailScreen {
        let first = ImageResult {
            filename: "00001.bin".to_string(),
            file_path: "individual/Latin/book-a/00001.bin.json".to_string(),
            models: BTreeMap::from([
                ("alpha".to_string(), model_result("Ecce homo", "Ecce horno", 88.9)),
                ("beta".to_string(), model_result("Ecce homo", "Ecce homo", 100.0)),
            ]),
        };
        let second = ImageResult {
            filename: "00002.bin".to_string(),
            file_path: "individual/Latin/book-a/00002.bin.json".to_string(),
            models: BTreeMap::from([(
                "alpha".to_string(),
                model_result("et verbum", "et vrbum", 70.0),
            )]),
        };

        let batch = DetailBatch {
            successful: vec![
                LoadedFile {
                    file: first.file_path.clone(),
                    cached: false,
                },
                LoadedFile {
                    file: second.file_path.clone(),
                    cached: true,
                },
            ],
            failed: vec![FileFailure {
                file: "individual/Latin/book-a/00003.bin.json".to_string(),
                reason: "timed out".to_string(),
            }],
            rejected: Vec::new(),
            data: BTreeMap::from([
                (first.file_path.clone(), Arc::new(first)),
                (second.file_path.clone(), Arc::new(second)),
            ]),
        };

        DetailScreen {
            category: "Latin".to_string(),
            subcategory: "book-a".to_string(),
            batch,
        }
    }

    #[test]
    fn test_summary_reports_load_problems() {
        let text = render_summary(&context());

        assert!(text.starts_with("OCR Benchmark Results\n"));
        assert!(text.contains("Last updated: 2025-03-01 12:30:00 | Total images: 45 | Models: 2"));
        assert!(text.contains("Warning: 1 of 3 result files failed to load"));
        assert!(text.contains("Warning: 1 model entries were invalid and skipped"));
    }

    #[test]
    fn test_summary_without_problems() {
        let mut ctx = context();
        ctx.failures.clear();
        ctx.rejected.clear();
        ctx.manifest.generated = None;

        let text = render_summary(&ctx);
        assert!(text.contains("Last updated: unknown"));
        assert!(!text.contains("Warning"));
    }

    #[test]
    fn test_leaderboard_weighted_rows() {
        let text = render_leaderboard(&context(), SortState::default());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "== Overall (weighted by image count) ==");
        assert!(lines[1].contains("Images"));
        assert!(lines[1].contains("Benchmarks"));
        assert!(lines[3].starts_with("1"));
        assert!(lines[3].contains("beta"));
        assert!(lines[3].contains("97.00*"));
        // alpha: (91 * 10 + 93 * 30) / 40
        assert!(lines[4].contains("alpha"));
        assert!(lines[4].contains("92.50"));
        let trailing: Vec<&str> = lines[4].split_whitespace().rev().take(2).collect();
        assert_eq!(trailing, vec!["2", "8"]);
    }

    #[test]
    fn test_leaderboard_without_models() {
        let mut ctx = context();
        ctx.aggregated = AggregatedData::new();

        let text = render_leaderboard(&ctx, SortState::default());
        assert!(text.ends_with("(no models)\n"));
    }

    #[test]
    fn test_dashboard_sections_in_manifest_order() {
        let text = render_dashboard(&context(), SortState::new(Metric::Wer, SortDirection::Asc));

        let latin = text.find("== Latin ==").unwrap();
        let greek = text.find("== Greek ==").unwrap();
        assert!(latin < greek);

        let book_a = text.find("-- book-a (10 images) --").unwrap();
        let book_b = text.find("-- book-b (30 images) --").unwrap();
        assert!(latin < book_a && book_a < book_b && book_b < greek);

        assert!(text.contains("== Greek ==\n(no results loaded)\n"));
        assert!(text.contains("WER (%) ▲"));
        assert!(text.contains("Warning: 1 of 3 result files failed to load"));
    }

    #[test]
    fn test_dashboard_empty_subcategory() {
        let mut ctx = context();
        ctx.aggregated.insert("Greek", "codex", SubcategoryResult::new());

        let text = render_dashboard(&ctx, SortState::default());
        assert!(text.contains("-- codex (5 images) --\n(no valid model entries)\n"));
        assert!(!text.contains("(no results loaded)"));
    }

    #[test]
    fn test_dashboard_json_document() {
        let value = dashboard_json(&context(), SortState::default());

        assert_eq!(value["generated"], "2025-03-01T12:30:00Z");
        assert_eq!(value["totalImages"], 45);
        assert_eq!(value["sort"], json!({ "column": "accuracy", "direction": "desc" }));

        assert_eq!(value["overall"][0]["model"], "beta");
        assert_eq!(value["overall"][1]["model"], "alpha");
        assert_eq!(value["overall"][1]["accuracy"], 92.5);
        assert_eq!(value["overall"][1]["totalImages"], 8);
        assert_eq!(value["overall"][1]["benchmarkCount"], 2);

        let categories = value["categories"].as_array().unwrap();
        assert_eq!(categories[0]["name"], "Latin");
        assert_eq!(categories[0]["subcategories"][1]["name"], "book-b");
        assert_eq!(categories[0]["subcategories"][1]["imageCount"], 30);
        assert_eq!(categories[1]["name"], "Greek");
        assert_eq!(categories[1]["subcategories"], json!([]));

        assert_eq!(value["failures"][0]["file"], "Greek/codex.json");
        assert_eq!(value["rejected"][0]["model"], "gamma");
    }

    #[test]
    fn test_details_lists_every_image() {
        let mut links = ModelLinks::new();
        links.insert("beta".to_string(), "https://example.org/beta".to_string());

        let text = render_details(&detail_screen(), ImageSort::FilenameAsc, None, false, &links);

        assert!(text.starts_with("Latin / book-a: 2 images, 2 models (sorted by filename-asc)\n"));
        assert!(text.contains("Models: alpha, beta\n"));
        assert!(text.contains("Warning: 1 of 3 files failed to load"));
        assert!(!text.contains("Showing model"));
        assert!(!text.contains("diff:"));

        assert!(text.contains("00001.bin  avg 94.45% (good)  images/Latin/book-a/00001.webp"));
        assert!(text.contains("  Ground truth: Ecce homo\n"));
        assert!(text.contains("00002.bin  avg 70.00% (low)  images/Latin/book-a/00002.webp"));
        assert!(text.find("00001.bin").unwrap() < text.find("00002.bin").unwrap());

        // Best model first, with its link
        let beta = text.find("  beta <https://example.org/beta>  100.00% (excellent)").unwrap();
        let alpha = text.find("  alpha  88.90% (good)").unwrap();
        assert!(beta < alpha);
    }

    #[test]
    fn test_details_model_projection_with_diff() {
        let screen = detail_screen();

        let text = render_details(&screen, ImageSort::AccuracyAsc, Some("alpha"), true, &ModelLinks::new());
        assert!(text.contains("Showing model: alpha (2 images)"));
        assert!(text.contains("    diff: Ecce [-homo-]{+horno+}"));
        assert!(text.contains("    diff: et [-verbum-]{+vrbum+}"));
        assert!(!text.contains("  beta"));
        assert!(text.find("00002.bin").unwrap() < text.find("00001.bin").unwrap());

        let text = render_details(&screen, ImageSort::FilenameAsc, Some("beta"), false, &ModelLinks::new());
        assert!(text.contains("Showing model: beta (1 images)"));
        assert!(!text.contains("00002.bin"));
    }

    #[test]
    fn test_details_json_document() {
        let screen = detail_screen();

        let value = details_json(&screen, ImageSort::AccuracyDesc, None, false);
        assert_eq!(value["category"], "Latin");
        assert_eq!(value["subcategory"], "book-a");
        assert_eq!(value["sort"], "accuracy-desc");
        assert_eq!(value["models"], json!(["alpha", "beta"]));
        assert_eq!(value["failed"][0]["reason"], "timed out");

        let images = value["images"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0]["filename"], "00001.bin");
        assert_eq!(images[0]["filePath"], "individual/Latin/book-a/00001.bin.json");
        assert_eq!(images[0]["imagePath"], "images/Latin/book-a/00001.webp");
        assert_eq!(images[0]["groundTruth"], "Ecce homo");
        assert_eq!(images[0]["band"], "good");
        assert_eq!(images[0]["models"][0]["model"], "beta");
        assert_eq!(images[0]["models"][0]["band"], "excellent");
        assert!(images[0]["models"][0].get("diff").is_none());
        assert_eq!(images[1]["band"], "low");
    }

    #[test]
    fn test_details_json_filtered_with_diff() {
        let value = details_json(&detail_screen(), ImageSort::FilenameAsc, Some("beta"), true);

        let images = value["images"].as_array().unwrap();
        assert_eq!(images.len(), 1);
        let models = images[0]["models"].as_array().unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0]["model"], "beta");
        assert_eq!(
            models[0]["diff"],
            json!([
                { "type": "equal", "value": "Ecce" },
                { "type": "equal", "value": " " },
                { "type": "equal", "value": "homo" }
            ])
        );
        // Model list still names every model in the batch
        assert_eq!(value["models"], json!(["alpha", "beta"]));
    }
}
