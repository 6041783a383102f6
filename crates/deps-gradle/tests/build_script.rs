//! End-to-end tests: read a build script, edit its dependencies, render it back.

use deps_core::{ScriptDocument, ScriptTree};
use deps_gradle::config::{FormatterConfig, QuoteStyle};
use deps_gradle::configuration_names::{COMPILE, IMPLEMENTATION, RUNTIME};
use deps_gradle::{
    ArtifactSpec, DependenciesCollection, GradleError, GradleModelConfig, NotationKind,
    load_build_script, parse_build_script, render_dependencies,
};
use insta::assert_snapshot;
use std::io::Write;

const ANDROID_SCRIPT: &str = "apply plugin: 'com.android.application'

android {
    compileSdkVersion 22
}

dependencies {
    compile 'com.android.support:appcompat-v7:22.1.1'
    compile('com.google.guava:guava:18.0')
    compile project(':javaLib')
    compile fileTree('libs')
    compile files('lib.jar')
    runtime group: 'org.gradle.test.classifiers', name: 'service', version: '1.0', classifier: 'jdk14', ext: 'jar'
    test 'org.gradle.test.classifiers:service:1.0:jdk15@jar'
}
";

fn collection(script: &str) -> DependenciesCollection<ScriptTree> {
    DependenciesCollection::new(parse_build_script(script).unwrap())
}

fn render(deps: &DependenciesCollection<ScriptTree>) -> String {
    render_dependencies(deps.document(), &FormatterConfig::default())
}

#[test]
fn test_only_artifacts_are_reported() {
    let deps = collection(ANDROID_SCRIPT);
    let compile = deps.artifacts_for(COMPILE);
    let names: Vec<_> = compile.iter().map(|v| v.name(deps.document())).collect();

    assert_eq!(names, vec!["appcompat-v7", "guava"]);
    assert_eq!(deps.configurations().len(), 3);
    assert_eq!(deps.artifacts().len(), 4);
}

#[test]
fn test_classifier_and_extension_in_both_notations() {
    let deps = collection(ANDROID_SCRIPT);
    let doc = deps.document();

    let runtime = deps.artifacts_for(RUNTIME).remove(0);
    assert_eq!(runtime.notation(), NotationKind::Map);
    assert_eq!(runtime.classifier(doc), Some("jdk14"));
    assert_eq!(runtime.extension(doc), Some("jar"));
    assert_eq!(
        runtime.compact_notation(doc),
        "org.gradle.test.classifiers:service:1.0:jdk14@jar"
    );

    let test = deps.artifacts_for("test").remove(0);
    assert_eq!(test.notation(), NotationKind::Compact);
    assert_eq!(test.classifier(doc), Some("jdk15"));
    assert_eq!(test.extension(doc), Some("jar"));
}

#[test]
fn test_edits_are_written_through() {
    let mut deps = collection(ANDROID_SCRIPT);

    let mut guava = deps.artifacts_for(COMPILE).remove(1);
    deps.set_version(&mut guava, "19.0").unwrap();
    let mut service = deps.artifacts_for(RUNTIME).remove(0);
    service
        .set_classifier(deps.document_mut(), None)
        .unwrap();
    deps.set_version(&mut service, "1.1").unwrap();

    let appcompat = deps.artifacts_for(COMPILE).remove(0);
    assert!(deps.remove(appcompat));
    deps.add_artifact_notation("testCompile", "junit:junit:4.12")
        .unwrap();

    assert_snapshot!(render(&deps), @r"
    dependencies {
        compile 'com.google.guava:guava:19.0'
        compile project(':javaLib')
        compile fileTree('libs')
        compile files('lib.jar')
        runtime group: 'org.gradle.test.classifiers', name: 'service', version: '1.1', ext: 'jar'
        test 'org.gradle.test.classifiers:service:1.0:jdk15@jar'
        testCompile 'junit:junit:4.12'
    }
    ");
}

#[test]
fn test_removing_wrapped_dependency_collapses_call() {
    let mut deps = collection(
        "dependencies {
    implementation platform('org.springframework:spring-bom:5.3.0')
    implementation enforcedPlatform('com.example:bom-a:1.0', 'com.example:bom-b:1.0')
    implementation 'com.google.guava:guava:18.0'
}
",
    );

    let views = deps.artifacts_for("implementation");
    assert_eq!(views.len(), 4);
    assert!(deps.remove(views[0].clone()));
    assert!(deps.remove(views[1].clone()));

    assert_snapshot!(render(&deps), @r"
    dependencies {
        implementation enforcedPlatform('com.example:bom-b:1.0')
        implementation 'com.google.guava:guava:18.0'
    }
    ");

    // Removing the last argument removes the call as well.
    assert!(deps.remove(views[2].clone()));
    assert!(!deps.remove(views[2].clone()));
    assert_eq!(deps.document().list("implementation").len(), 1);
}

#[test]
fn test_render_round_trip() {
    let tree = parse_build_script(ANDROID_SCRIPT).unwrap();
    let rendered = render_dependencies(&tree, &FormatterConfig::default());
    let reparsed = parse_build_script(&rendered).unwrap();

    assert_eq!(reparsed.list_names(), tree.list_names());
    assert_eq!(render_dependencies(&reparsed, &FormatterConfig::default()), rendered);
}

#[test]
fn test_configured_model() {
    let config = GradleModelConfig::from_json(
        r#"{
            "segment_policy": "strict",
            "extra_excluded_callees": ["gradleApi"],
            "formatter": { "quote_style": "double", "indent": 2 }
        }"#,
    )
    .unwrap();
    let tree = parse_build_script(
        "dependencies {
    compile gradleApi('com.example:ignored:1.0')
    compile 'a:b:c:d:e'
    compile 'com.example:kept:1.0'
}",
    )
    .unwrap();

    let mut deps = DependenciesCollection::with_config(tree, &config);
    let views = deps.artifacts_for(COMPILE);
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].name(deps.document()), "kept");

    let err = deps.add_artifact_notation(COMPILE, "a:b:c:d:e").unwrap_err();
    assert!(matches!(err, GradleError::InvalidNotation { .. }));

    let spec = ArtifactSpec::new("extra", Some("com.example"), Some("2.0")).unwrap();
    deps.add_artifact(COMPILE, &spec).unwrap();

    assert_snapshot!(render_dependencies(deps.document(), &config.formatter), @r#"
    dependencies {
      compile gradleApi("com.example:ignored:1.0")
      compile "a:b:c:d:e"
      compile "com.example:kept:1.0"
      compile "com.example:extra:2.0"
    }
    "#);
    assert_eq!(config.formatter.quote_style, QuoteStyle::Double);
}

#[test]
fn test_closures_survive_edit_and_render() {
    let mut deps = collection(
        "dependencies {
    compile('org.hibernate:hibernate:3.1') { force = true }
    compile 'com.google.guava:guava:18.0'
}
",
    );
    let mut hibernate = deps.artifacts_for(COMPILE).remove(0);
    deps.set_version(&mut hibernate, "3.0").unwrap();

    let rendered = render(&deps);
    assert_snapshot!(rendered, @r"
    dependencies {
        compile('org.hibernate:hibernate:3.0') { force = true }
        compile 'com.google.guava:guava:18.0'
    }
    ");

    let reparsed = parse_build_script(&rendered).unwrap();
    assert_eq!(render_dependencies(&reparsed, &FormatterConfig::default()), rendered);
}

const VARIABLES_SCRIPT: &str = r#"ext {
    appcompat = 'com.android.support:appcompat-v7:22.1.1'
    guavaVersion = '18.0'
}

dependencies {
    compile appcompat
    runtime "com.google.guava:guava:$guavaVersion"
    compile group: 'com.google.guava', name: 'guava', version: "$guavaVersion"
    implementation group: 'com.squareup', name: 'okio', version: okioVersion
}
"#;

#[test]
fn test_variables_resolve_in_both_notations() {
    let deps = collection(VARIABLES_SCRIPT);
    let doc = deps.document();

    let compile: Vec<_> = deps
        .artifacts_for(COMPILE)
        .iter()
        .map(|view| view.compact_notation(doc))
        .collect();
    assert_eq!(
        compile,
        vec!["com.android.support:appcompat-v7:22.1.1", "com.google.guava:guava:18.0"]
    );

    let guava: ArtifactSpec = "com.google.guava:guava:18.0".parse().unwrap();
    assert!(deps.contains_artifact(RUNTIME, &guava));
    assert!(deps.contains_artifact(COMPILE, &guava));
}

#[test]
fn test_unknown_variable_never_matches() {
    let deps = collection(VARIABLES_SCRIPT);
    let okio = deps.artifacts_for(IMPLEMENTATION).remove(0);
    let doc = deps.document();

    assert_eq!(okio.version(doc), None);
    assert_eq!(okio.compact_notation(doc), "com.squareup:okio:${okioVersion}");
    let literal = ArtifactSpec::new("okio", Some("com.squareup"), Some("okioVersion")).unwrap();
    assert!(!deps.contains_artifact(IMPLEMENTATION, &literal));
}

#[test]
fn test_editing_a_template_writes_a_plain_literal() {
    let mut deps = collection(VARIABLES_SCRIPT);
    let mut guava = deps.artifacts_for(RUNTIME).remove(0);
    deps.set_version(&mut guava, "19.0").unwrap();

    assert_snapshot!(render(&deps), @r#"
    dependencies {
        compile appcompat
        compile group: 'com.google.guava', name: 'guava', version: "$guavaVersion"
        runtime 'com.google.guava:guava:19.0'
        implementation group: 'com.squareup', name: 'okio', version: okioVersion
    }
    "#);
}

#[test]
fn test_apply_inside_dependencies_block() {
    let deps = collection(
        "dependencies {
    apply plugin: 'java'
    compile 'com.google.guava:guava:18.0'
}
",
    );

    assert_eq!(deps.configurations(), vec![COMPILE]);
    assert_eq!(deps.artifacts().len(), 1);
}

#[test]
fn test_load_build_script_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(ANDROID_SCRIPT.as_bytes()).unwrap();

    let tree = load_build_script(file.path()).unwrap();
    assert_eq!(tree.list_names(), vec![COMPILE, RUNTIME, "test"]);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_build_script(dir.path().join("build.gradle")).unwrap_err();
    assert!(matches!(err, GradleError::Io(_)));
}

#[test]
fn test_parse_error_line() {
    let err = parse_build_script("dependencies {\n    compile 'g:a:1.0\n}\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to parse build script at line 2: unterminated string literal"
    );
}
