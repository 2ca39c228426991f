//! Misspelled-word correction against a fixed table of common typos.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

const CORRECTIONS: &[(&str, &str)] = &[
    ("abilty", "ability"),
    ("acceleratoin", "acceleration"),
    ("accessable", "accessible"),
    ("accomodate", "accommodate"),
    ("accross", "across"),
    ("acheive", "achieve"),
    ("acknowlege", "acknowledge"),
    ("adress", "address"),
    ("adresses", "addresses"),
    ("algoritm", "algorithm"),
    ("allways", "always"),
    ("alot", "a lot"),
    ("anaolg", "analog"),
    ("arguement", "argument"),
    ("asynchonous", "asynchronous"),
    ("attatch", "attach"),
    ("availabe", "available"),
    ("availible", "available"),
    ("becuase", "because"),
    ("begining", "beginning"),
    ("beleive", "believe"),
    ("brocoli", "broccoli"),
    ("buton", "button"),
    ("calender", "calendar"),
    ("calibraton", "calibration"),
    ("charachter", "character"),
    ("commited", "committed"),
    ("communcation", "communication"),
    ("compatable", "compatible"),
    ("compatibilty", "compatibility"),
    ("compatiblity", "compatibility"),
    ("completly", "completely"),
    ("conection", "connection"),
    ("configuraton", "configuration"),
    ("conrol", "control"),
    ("controler", "controller"),
    ("convertor", "converter"),
    ("curent", "current"),
    ("definately", "definitely"),
    ("dependant", "dependent"),
    ("desription", "description"),
    ("diplay", "display"),
    ("dispaly", "display"),
    ("distnace", "distance"),
    ("easilly", "easily"),
    ("efficent", "efficient"),
    ("enviroment", "environment"),
    ("equiped", "equipped"),
    ("exmaple", "example"),
    ("exmaples", "examples"),
    ("existance", "existence"),
    ("experiance", "experience"),
    ("familar", "familiar"),
    ("funtion", "function"),
    ("funtions", "functions"),
    ("funcion", "function"),
    ("futher", "further"),
    ("gaurd", "guard"),
    ("grammer", "grammar"),
    ("harware", "hardware"),
    ("humidty", "humidity"),
    ("immediatly", "immediately"),
    ("implemention", "implementation"),
    ("independant", "independent"),
    ("infomation", "information"),
    ("initalize", "initialize"),
    ("initialze", "initialize"),
    ("interupt", "interrupt"),
    ("interupts", "interrupts"),
    ("keybord", "keyboard"),
    ("libary", "library"),
    ("libaries", "libraries"),
    ("libraray", "library"),
    ("lenght", "length"),
    ("measurment", "measurement"),
    ("memmory", "memory"),
    ("messsage", "message"),
    ("micropocessor", "microprocessor"),
    ("modul", "module"),
    ("neccessary", "necessary"),
    ("necesary", "necessary"),
    ("occured", "occurred"),
    ("occurence", "occurrence"),
    ("paramter", "parameter"),
    ("paramters", "parameters"),
    ("perfomance", "performance"),
    ("peripherial", "peripheral"),
    ("posible", "possible"),
    ("prefered", "preferred"),
    ("presure", "pressure"),
    ("proccess", "process"),
    ("programing", "programming"),
    ("protocall", "protocol"),
    ("provid", "provide"),
    ("recieve", "receive"),
    ("recieved", "received"),
    ("recieving", "receiving"),
    ("refered", "referred"),
    ("registar", "register"),
    ("resistence", "resistance"),
    ("resoution", "resolution"),
    ("respons", "response"),
    ("seperate", "separate"),
    ("seperately", "separately"),
    ("sensore", "sensor"),
    ("servoes", "servos"),
    ("similiar", "similar"),
    ("simpel", "simple"),
    ("sofware", "software"),
    ("suport", "support"),
    ("suported", "supported"),
    ("supress", "suppress"),
    ("temperture", "temperature"),
    ("tempreature", "temperature"),
    ("thier", "their"),
    ("timming", "timing"),
    ("transmition", "transmission"),
    ("truely", "truly"),
    ("untill", "until"),
    ("usefull", "useful"),
    ("usign", "using"),
    ("varible", "variable"),
    ("verison", "version"),
    ("voltge", "voltage"),
    ("wich", "which"),
    ("wirless", "wireless"),
    ("writting", "writing"),
    ("zeebra", "zebra"),
];

static TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| CORRECTIONS.iter().copied().collect());

static WORD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[A-Za-z]+").ok());

fn match_case(original: &str, correction: &str) -> String {
    if original.len() > 1 && original.chars().all(|c| c.is_ascii_uppercase()) {
        return correction.to_ascii_uppercase();
    }
    if original.starts_with(|c: char| c.is_ascii_uppercase()) {
        let mut chars = correction.chars();
        return chars
            .next()
            .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
            .unwrap_or_default();
    }
    correction.to_string()
}

/// Returns `text` with every known misspelling replaced, preserving case.
#[must_use]
pub fn correct(text: &str) -> String {
    let Some(word) = WORD.as_ref() else {
        return text.to_string();
    };
    word.replace_all(text, |caps: &regex::Captures<'_>| {
        let found = &caps[0];
        match TABLE.get(found.to_ascii_lowercase().as_str()) {
            Some(correction) => match_case(found, correction),
            None => found.to_string(),
        }
    })
    .into_owned()
}

/// Returns the corrected text if it differs from `text`.
#[must_use]
pub fn check(text: &str) -> Option<String> {
    let corrected = correct(text);
    (corrected != text).then_some(corrected)
}
