// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

mod common;

use std::sync::Arc;

use addon_scraper::{
    AddonRecord, Aggregator, Blacklist, CancelToken, DEFAULT_DESCRIPTION, FetchError, Outcome,
    TEMPLATE_DESCRIPTION, TEMPLATE_TITLE, cancellation,
};
use base64::{Engine as _, engine::general_purpose};
use common::{
    FakeHost, ICON_PATH, MAIN_CLASS_PATH, MODULES_PATH, RAW, asset, dir, file, pipeline,
    pipeline_with, raw, release, repository,
};
use proptest::prelude::*;

const DESCRIPTOR_PATH: &str = "src/main/resources/fabric.mod.json";

async fn run(host: FakeHost,) -> Outcome
{
    pipeline(host,).run(&repository("a", "addon",), &CancelToken::never(),).await
}

fn accepted(outcome: Outcome,) -> AddonRecord
{
    match outcome {
        Outcome::Accepted(record,) => record,
        other => panic!("expected acceptance, got {other:?}"),
    }
}

fn rejection(outcome: Outcome,) -> String
{
    match outcome {
        Outcome::Rejected(record,) => {
            assert_eq!(record.id, "a/addon");
            assert_eq!(record.repo_meta.author, "a");
            record.error
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

fn valid() -> FakeHost
{
    FakeHost::new().with_addon("a", "addon",)
}

#[tokio::test]
async fn valid_addon_is_fully_extracted()
{
    let record = accepted(run(valid(),).await,);

    assert_eq!(record.id, "a/addon");
    assert_eq!(record.name, "Cool Addon");
    assert_eq!(record.description, "Does cool things");
    assert_eq!(record.authors, ["Alice", "Bob"]);
    assert_eq!(record.features, ["Alpha", "Zeta"]);
    assert_eq!(record.minecraft_version, "1.19.3");
    assert_eq!(record.meteor_version, "0.5.2");
    assert_eq!(record.discord_url.as_deref(), Some("https://discord.gg/cool123"));
    assert_eq!(record.repo_meta.url, "https://github.com/a/addon");
    assert_eq!(record.repo_meta.default_branch, "main");

    assert_eq!(record.download_meta.file_name, "cool-1.0.0.jar");
    assert_eq!(record.download_meta.download_url, "https://downloads.test/cool-1.0.0.jar");
    assert_eq!(
        record.download_meta.release_url,
        "https://github.com/a/addon/releases/tag/v1.0.0"
    );
    assert_eq!(record.download_meta.download_count, 7);
}

#[tokio::test]
async fn icon_is_resized_preserving_aspect_ratio()
{
    let record = accepted(run(valid(),).await,);

    assert_eq!(record.icon_url.as_deref(), Some(raw("a", "addon", ICON_PATH,).as_str()));
    let encoded = record.compressed_icon.expect("icon payload",);
    let bytes = general_purpose::STANDARD.decode(encoded,).expect("valid base64",);
    let thumbnail = image::load_from_memory(&bytes,).expect("valid image",);
    assert_eq!((thumbnail.width(), thumbnail.height()), (64, 32));
}

#[tokio::test]
async fn icon_failures_leave_both_fields_empty()
{
    let mut missing = valid();
    missing.remove("a", "addon", ICON_PATH,);

    let mut corrupt = valid();
    corrupt.add_text("a", "addon", ICON_PATH, "not an image",);

    for host in [missing, corrupt,] {
        let record = accepted(run(host,).await,);
        assert_eq!(record.icon_url, None);
        assert_eq!(record.compressed_icon, None);
    }
}

#[tokio::test]
async fn missing_readme_is_rejected()
{
    let mut host = valid();
    host.remove("a", "addon", "README.md",);
    assert_eq!(rejection(run(host).await), "No readme");

    let mut blank = valid();
    blank.add_text("a", "addon", "README.md", "  \n\t",);
    assert_eq!(rejection(run(blank).await), "No readme");

    let mut failing = valid();
    failing.failing.insert(raw("a", "addon", "README.md",),);
    assert_eq!(rejection(run(failing).await), "No readme");
}

#[tokio::test]
async fn template_readme_requires_both_phrases()
{
    let mut template = valid();
    template.add_text(
        "a",
        "addon",
        "README.md",
        &format!("# {TEMPLATE_TITLE}\n\n{TEMPLATE_DESCRIPTION}\n"),
    );
    assert_eq!(rejection(run(template).await), "Unused clone/fork");

    let mut title_only = valid();
    title_only.add_text("a", "addon", "README.md", &format!("# {TEMPLATE_TITLE}\n\nMy fork.\n"),);
    accepted(run(title_only,).await,);
}

#[tokio::test]
async fn missing_build_files_are_rejected()
{
    let mut no_gradle = valid();
    no_gradle.remove("a", "addon", "gradle.properties",);
    assert_eq!(rejection(run(no_gradle).await), "Error getting gradle.properties data");

    let mut no_descriptor = valid();
    no_descriptor.remove("a", "addon", DESCRIPTOR_PATH,);
    assert_eq!(rejection(run(no_descriptor).await), "Error getting fabric.mod.json data");

    let mut broken_descriptor = valid();
    broken_descriptor.add_text("a", "addon", DESCRIPTOR_PATH, "{ \"name\": ",);
    assert_eq!(rejection(run(broken_descriptor).await), "Error parsing fabric.mod.json data");
}

#[tokio::test]
async fn blacklisted_descriptor_author_is_rejected()
{
    let blacklist = Blacklist::new(["Bob",], Vec::<String,>::new(),);
    let outcome = pipeline_with(valid(), blacklist,)
        .run(&repository("a", "addon",), &CancelToken::never(),)
        .await;
    assert_eq!(rejection(outcome), "Blacklisted author in fabric json author list");
}

#[tokio::test]
async fn authors_fall_back_to_repository_owner()
{
    let descriptor = r#"{"entrypoints": {"meteor": ["com.cool.addon.CoolAddon"]}}"#;

    let mut host = valid();
    host.add_text("a", "addon", DESCRIPTOR_PATH, descriptor,);
    let record = accepted(run(host,).await,);
    assert_eq!(record.authors, ["a"]);
    assert_eq!(record.name, "addon");
    assert_eq!(record.description, DEFAULT_DESCRIPTION);
    assert_eq!(record.icon_url, None);

    let mut blocked = valid();
    blocked.add_text("a", "addon", DESCRIPTOR_PATH, descriptor,);
    let outcome = pipeline_with(blocked, Blacklist::new(["a",], Vec::<String,>::new(),),)
        .run(&repository("a", "addon",), &CancelToken::never(),)
        .await;
    assert_eq!(rejection(outcome), "Blacklisted author in fabric json author list");
}

#[tokio::test]
async fn build_configuration_is_validated()
{
    let mut no_meteor = valid();
    no_meteor.add_text("a", "addon", "gradle.properties", "minecraft_version=1.19.3\n",);
    assert_eq!(rejection(run(no_meteor).await), "Error with gradle.properties");

    let mut empty_value = valid();
    empty_value.add_text(
        "a",
        "addon",
        "gradle.properties",
        "minecraft_version=\nmeteor_version=0.5.2\n",
    );
    assert_eq!(rejection(run(empty_value).await), "Error with gradle.properties");

    let mut outdated = valid();
    outdated.add_text(
        "a",
        "addon",
        "gradle.properties",
        "minecraft_version=1.18.2\nmeteor_version=0.5.0\n",
    );
    assert_eq!(rejection(run(outdated).await), "Outdated minecraft version");
}

#[tokio::test]
async fn release_problems_are_rejected()
{
    let mut missing = valid();
    missing.releases.clear();
    assert_eq!(rejection(run(missing).await), "No release available");

    let mut failing = valid();
    failing
        .releases
        .insert("a/addon".to_owned(), Err(FetchError::transient("release", "HTTP 502",),),);
    assert_eq!(rejection(run(failing).await), "No release available");

    let mut dev_only = valid();
    dev_only
        .releases
        .insert("a/addon".to_owned(), Ok(release("a", "addon", vec![asset("cool-dev.jar")],),),);
    assert_eq!(rejection(run(dev_only).await), "No valid release asset available.");
}

#[tokio::test]
async fn entrypoint_and_main_class_are_required()
{
    let mut no_meteor = valid();
    no_meteor.add_text(
        "a",
        "addon",
        DESCRIPTOR_PATH,
        r#"{"name": "x", "entrypoints": {"client": ["com.cool.addon.CoolAddon"]}}"#,
    );
    assert_eq!(rejection(run(no_meteor).await), "Invalid or improper entrypoint");

    let mut no_source = valid();
    no_source.remove("a", "addon", MAIN_CLASS_PATH,);
    assert_eq!(rejection(run(no_source).await), "Main class data is invalid");
}

#[tokio::test]
async fn invite_prefers_homepage_then_description_then_readme()
{
    let mut repo = repository("a", "addon",);
    repo.homepage = Some("https://discord.com/invite/home?ref=site".to_owned(),);
    repo.description = Some("Chat at https://discord.gg/desc".to_owned(),);
    let record = accepted(pipeline(valid(),).run(&repo, &CancelToken::never(),).await,);
    assert_eq!(record.discord_url.as_deref(), Some("https://discord.com/invite/home?ref=site"));

    repo.homepage = Some("https://cool.example".to_owned(),);
    let record = accepted(pipeline(valid(),).run(&repo, &CancelToken::never(),).await,);
    assert_eq!(record.discord_url.as_deref(), Some("https://discord.gg/desc"));

    let mut quiet = valid();
    quiet.add_text("a", "addon", "README.md", "# Cool Addon\nNo links here.\n",);
    let record = accepted(run(quiet,).await,);
    assert_eq!(record.discord_url, None);
}

#[tokio::test]
async fn empty_main_class_falls_back_to_one_level_module_scan()
{
    let mut host = valid();
    host.add_text("a", "addon", MAIN_CLASS_PATH, "public class CoolAddon {}\n",);
    host.add_directory("a", "addon", MODULES_PATH, vec![
        file("Fly.java", MODULES_PATH,),
        file("notes.md", MODULES_PATH,),
        dir("combat", MODULES_PATH,),
    ],);
    let combat = format!("{MODULES_PATH}/combat");
    host.add_directory("a", "addon", &combat, vec![
        file("KillAura.java", &combat,),
        file("Fly.java", &combat,),
        dir("deep", &combat,),
    ],);
    let deep = format!("{combat}/deep");
    host.add_directory("a", "addon", &deep, vec![file("Hidden.java", &deep,)],);

    let pipeline = pipeline(host,);
    let record =
        accepted(pipeline.run(&repository("a", "addon",), &CancelToken::never(),).await,);

    assert_eq!(record.features, ["Fly", "KillAura"]);
    assert!(!pipeline.host().calls().iter().any(|call| call.ends_with("/deep")));
}

#[tokio::test]
async fn module_scan_failure_is_not_fatal()
{
    let mut host = valid();
    host.add_text("a", "addon", MAIN_CLASS_PATH, "public class CoolAddon {}\n",);

    let record = accepted(run(host,).await,);
    assert!(record.features.is_empty());
}

#[tokio::test]
async fn module_scan_is_skipped_when_main_class_registers_features()
{
    let pipeline = pipeline(valid(),);
    accepted(pipeline.run(&repository("a", "addon",), &CancelToken::never(),).await,);
    assert!(!pipeline.host().calls().iter().any(|call| call.starts_with("list ")));
}

#[tokio::test]
async fn cancellation_produces_no_record()
{
    let (handle, token,) = cancellation();
    handle.cancel();
    let outcome = pipeline(valid(),).run(&repository("a", "addon",), &token,).await;
    assert_eq!(outcome, Outcome::Cancelled {
        id: "a/addon".to_owned(),
    });

    let (handle, token,) = cancellation();
    let mut host = valid();
    host.cancel_on = Some((raw("a", "addon", "gradle.properties",), Arc::new(handle,),),);
    let pipeline = pipeline(host,);
    let aggregator = Aggregator::new();
    aggregator.record(pipeline.run(&repository("a", "addon",), &token,).await,);

    assert_eq!(aggregator.counts(), (0, 0));
    let calls = pipeline.host().calls();
    assert!(!calls.iter().any(|call| call.contains("fabric.mod.json")), "{calls:?}");
}

#[tokio::test]
async fn raw_urls_use_default_branch()
{
    let mut repo = repository("a", "addon",);
    repo.default_branch = "master".to_owned();

    let pipeline = pipeline(valid(),);
    let outcome = pipeline.run(&repo, &CancelToken::never(),).await;

    assert_eq!(rejection(outcome), "No readme");
    assert_eq!(pipeline.host().calls(), [format!("fetch {RAW}/a/addon/master/README.md")]);
}

const OPTIONAL_FILES: [&str; 4] =
    ["README.md", "gradle.properties", DESCRIPTOR_PATH, MAIN_CLASS_PATH,];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_repository_yields_exactly_one_record(
        removed in prop::collection::vec(any::<bool>(), OPTIONAL_FILES.len()),
        has_release in any::<bool>(),
    ) {
        let mut host = valid();
        for (path, remove) in OPTIONAL_FILES.iter().zip(&removed) {
            if *remove {
                host.remove("a", "addon", path);
            }
        }
        if !has_release {
            host.releases.clear();
        }
        let complete = removed.iter().all(|remove| !remove) && has_release;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let aggregator = Aggregator::new();
        aggregator.record(runtime.block_on(run(host)));

        let (addons, errors) = aggregator.counts();
        prop_assert_eq!(addons + errors, 1);
        prop_assert_eq!(addons == 1, complete);
    }
}
