//! PHP templates for the generated bootstrap files.
//!
//! Placeholders in braces are substituted with `str::replace`.

/// Starts every block appended to an existing bootstrap file.
pub const OPENER: &str = "
/**
 * THIS BLOCK HAS BEEN ADDED BY THE NIGHTLY PACKAGE BUILDER.
 * DO NOT REMOVE!
 */
";

/// Ends every appended block.
pub const CLOSER: &str = "
/**
 * END OF NIGHTLY PACKAGE BUILDER ADDED BLOCK.
 */
";

/// Content of a bootstrap file that did not exist yet.
pub const EMPTY_BOOTSTRAP: &str = "<?php\n\n";

/// Appended to `config/autoload.php`.
/// Contains {module} placeholder.
pub const AUTOLOAD_BLOCK: &str = "require_once(TL_ROOT . '/{module}/config/vendor_autoload.php');";

/// Appended to `config/config.php`. Registers the indexed classes with the
/// class cache of platform versions older than {threshold}.
/// Contains {module}, {threshold} and {classes} placeholders.
pub const LEGACY_CONFIG_BLOCK: &str = r#"if (version_compare(VERSION, '{threshold}', '<')) {
    spl_autoload_unregister('__autoload');
    require_once(TL_ROOT . '/{module}/config/vendor_autoload.php');
    spl_autoload_register('__autoload');

    $classes = array(
        {classes}
    );
    $cache = FileCache::getInstance('classes');
    foreach ($classes as $class) {
        if (!$cache->$class) {
            $cache->$class = true;
        }
    }
}"#;

/// The class index file `config/vendor_autoload.php`.
/// Contains {hash} and {classes} placeholders.
pub const VENDOR_AUTOLOAD: &str = r#"<?php
/**
 * This file has been auto generated by the nightly build script and is only needed for nightly builds.
 */

function autoload_{hash}($className)
{
    $classes =
{classes};
    if (isset($classes[$className]))
    {
        require_once(TL_ROOT . '/' . $classes[$className]);
    }
}

spl_autoload_register('autoload_{hash}');
"#;
